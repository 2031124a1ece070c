//! Error types for coordinators.

use sharewatch_types::Failure;
use thiserror::Error;

/// Errors surfaced by coordinator setup and the first refresh.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// The first cycle failed; the share may become reachable later.
    #[error("Coordinator not ready: {0}")]
    NotReady(Failure),

    /// Another cycle was already in flight.
    #[error("A refresh cycle is already in flight")]
    Busy,

    /// The coordinator has been torn down.
    #[error("Coordinator has been shut down")]
    ShutDown,

    /// The builder was missing a required setting.
    #[error("Coordinator is missing a {0}")]
    Incomplete(&'static str),

    /// A duration setting was zero.
    #[error("Coordinator {0} must be greater than zero")]
    ZeroDuration(&'static str),
}

impl CoordinatorError {
    /// Whether retrying the same operation later can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoordinatorError::NotReady(_) | CoordinatorError::Busy)
    }

    /// The failure behind a not-ready error.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            CoordinatorError::NotReady(failure) => Some(failure),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharewatch_types::FailureKind;

    #[test]
    fn test_retryable() {
        let not_ready = CoordinatorError::NotReady(Failure::new(FailureKind::Timeout, ""));
        assert!(not_ready.is_retryable());
        assert!(CoordinatorError::Busy.is_retryable());
        assert!(!CoordinatorError::ShutDown.is_retryable());
        assert!(!CoordinatorError::Incomplete("fetcher").is_retryable());
        assert!(!CoordinatorError::ZeroDuration("interval").is_retryable());
    }

    #[test]
    fn test_display() {
        let err = CoordinatorError::NotReady(Failure::new(FailureKind::RateLimited, "429"));
        assert_eq!(err.to_string(), "Coordinator not ready: rate_limited: 429");
        assert_eq!(err.failure().map(|f| f.kind), Some(FailureKind::RateLimited));
    }
}
