//! Setup routine: awaits the first refresh before anything depends on it.

use std::sync::Arc;
use std::time::Duration;

use sharewatch_sdk::{Coordinator, CoordinatorError, Snapshot};
use tracing::{info, warn};

/// How the setup routine reacts to a share that is not ready yet.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Give up after the first failed attempt.
    pub fail_fast: bool,
    /// Pause between attempts.
    pub delay: Duration,
    /// Upper bound on attempts; `None` retries until teardown.
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Retry every `delay` until the share answers.
    pub fn every(delay: Duration) -> Self {
        Self {
            fail_fast: false,
            delay,
            max_attempts: None,
        }
    }

    /// A single attempt.
    pub fn fail_fast() -> Self {
        Self {
            fail_fast: true,
            delay: Duration::ZERO,
            max_attempts: Some(1),
        }
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    fn allows(&self, attempt: u32) -> bool {
        !self.fail_fast && self.max_attempts.map_or(true, |max| attempt < max)
    }
}

/// Run the first refresh, retrying retryable failures per `policy`.
///
/// Returns the first successful snapshot. Non-retryable errors (the
/// coordinator was shut down) are returned immediately.
pub async fn await_first_refresh(
    coordinator: &Coordinator,
    policy: RetryPolicy,
) -> Result<Arc<Snapshot>, CoordinatorError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match coordinator.first_refresh().await {
            Ok(snapshot) => {
                info!(
                    coordinator = %coordinator.name(),
                    units = snapshot.len(),
                    attempt,
                    "share ready"
                );
                return Ok(snapshot);
            }
            Err(e) if e.is_retryable() && policy.allows(attempt) => {
                warn!(
                    coordinator = %coordinator.name(),
                    attempt,
                    "share not ready, retrying in {:?}: {}",
                    policy.delay,
                    e
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
