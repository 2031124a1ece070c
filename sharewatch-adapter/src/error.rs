//! Error types for polling.

use sharewatch_types::{Failure, FailureKind};
use thiserror::Error;

/// Errors that can end a poll cycle.
#[derive(Debug, Error)]
pub enum PollError {
    /// The share does not exist (HTTP 404).
    #[error("Share not found")]
    NotFound,

    /// The share code was rejected (HTTP 401/403).
    #[error("Share code rejected (HTTP {0})")]
    InvalidCredential(u16),

    /// Too many requests (HTTP 429).
    #[error("Rate limited by the share API")]
    RateLimited,

    /// Any other non-2xx status.
    #[error("API returned status {0}")]
    Http(u16),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// 2xx response whose body is not JSON.
    #[error("Failed to parse response: {0}")]
    MalformedBody(String),

    /// JSON response without the expected shape.
    #[error("Unexpected response: {0}")]
    SchemaViolation(String),
}

impl PollError {
    /// The classified kind of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            PollError::NotFound => FailureKind::NotFound,
            PollError::InvalidCredential(_) => FailureKind::InvalidCredential,
            PollError::RateLimited => FailureKind::RateLimited,
            PollError::Http(status) => FailureKind::HttpError(*status),
            PollError::Timeout => FailureKind::Timeout,
            PollError::Connection(_) => FailureKind::ConnectionFailure,
            PollError::MalformedBody(_) => FailureKind::MalformedBody,
            PollError::SchemaViolation(_) => FailureKind::SchemaViolation,
        }
    }

    /// Convert into the failure descriptor recorded in a snapshot.
    pub fn into_failure(self) -> Failure {
        Failure::new(self.kind(), self.to_string())
    }
}

impl From<PollError> for Failure {
    fn from(err: PollError) -> Self {
        err.into_failure()
    }
}

impl From<reqwest::Error> for PollError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PollError::Timeout
        } else if err.is_decode() {
            PollError::MalformedBody(err.to_string())
        } else {
            PollError::Connection(err.to_string())
        }
    }
}
