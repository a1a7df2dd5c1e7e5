//! Retry policy for remote calls
//!
//! Wraps one remote status-change call with bounded retries and a fixed
//! (not exponential) delay between attempts. The inter-row delay is a
//! separate concern owned by the batch runner.
//!
//! The policy never decides *what* is retryable itself; that classification
//! lives on [`RemoteError::is_retryable`] so the set of retryable kinds
//! stays closed.

use std::future::Future;
use std::time::Duration;

use crate::types::RemoteError;

/// Bounded retry with fixed backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts allowed after the first call
    pub max_retries: u32,

    /// Fixed delay between successive attempts
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with explicit bounds
    pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
        RetryPolicy {
            max_retries,
            retry_delay,
        }
    }

    /// Execute a call under this policy
    ///
    /// Returns the final result together with the number of retries used
    /// (attempts beyond the first). A terminal error on the first attempt
    /// therefore reports zero retries.
    pub async fn run<F, Fut, T>(&self, mut call: F) -> (Result<T, RemoteError>, u32)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let mut retries = 0;
        loop {
            match call().await {
                Ok(value) => return (Ok(value), retries),
                Err(e) if e.is_retryable() && retries < self.max_retries => {
                    retries += 1;
                    tracing::warn!(
                        error = %e,
                        retry = retries,
                        max_retries = self.max_retries,
                        "transient remote failure, retrying"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return (Err(e), retries),
            }
        }
    }
}
