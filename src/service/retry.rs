//! Retries for transient storage failures

use std::future::Future;
use std::time::Duration;

use crate::storage;

/// How often and how patiently a failing storage operation is tried again
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Maximum number of retries, not counting the initial attempt
    pub max_retries: u32,

    /// Backoff before the first retry
    pub initial_backoff: Duration,

    /// Upper bound of any backoff
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Never retry
    #[cfg(test)]
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Backoff before retry `attempt` (0-indexed), doubling every time
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(100),
        }
    }
}

/// Run a storage operation, retrying it while it fails with a retryable error
///
/// Non-retryable errors (like [`storage::Error::AlreadyExists`]) are returned immediately
pub async fn with_retries<F, Fut, T>(policy: &RetryPolicy, mut operation: F) -> storage::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = storage::Result<T>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < policy.max_retries => {
                let backoff = policy.backoff(attempt);

                tracing::warn!("Storage operation failed, retrying in {backoff:?}: {err}");

                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
