//! Bounded retry around whole sync attempts.
//!
//! A retried attempt re-enters from the top (fingerprint, checkpoint
//! lookup, plan, execute), so it resumes from whatever checkpoint the failed
//! attempt left behind. The attempt count is a local of [`run_with_retry`]:
//! every call starts with a fresh budget. An interrupt during the wait
//! ends the retry loop instead of delaying it.

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::Result;
use crate::sync::interrupt::CancelToken;

/// Default number of automatic retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default fixed delay before each retry.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Fixed-delay retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Wait before each retry.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Run `attempt` until it succeeds, fails non-retryably, or the budget runs out.
///
/// `attempt` receives the zero-based attempt number. Only errors for which
/// [`crate::error::Error::is_retryable`] holds are retried. The delay
/// between attempts is a suspension point: if `cancel` fires before or
/// during it, no further attempt is made and `Ok(None)` is returned.
///
/// # Errors
///
/// Returns the last attempt's error.
pub async fn run_with_retry<T, F, Fut>(
    operation: &str,
    policy: RetryPolicy,
    cancel: &CancelToken,
    mut attempt: F,
) -> Result<Option<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempts: u32 = 0;

    loop {
        match attempt(attempts).await {
            Ok(value) => {
                if attempts > 0 {
                    info!(operation, attempt = attempts, "Operation succeeded after retry");
                }
                return Ok(Some(value));
            }
            Err(err) if err.is_retryable() && attempts < policy.max_retries => {
                attempts += 1;
                warn!(
                    operation,
                    attempt = attempts,
                    max_retries = policy.max_retries,
                    delay_ms = u64::try_from(policy.delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "Transient error, retrying from last checkpoint"
                );

                tokio::select! {
                    biased;

                    () = cancel.cancelled() => {
                        warn!(operation, attempt = attempts, "Interrupted while waiting to retry");
                        return Ok(None);
                    }

                    () = tokio::time::sleep(policy.delay) => {}
                }
            }
            Err(err) => {
                if err.is_retryable() {
                    warn!(operation, attempts = attempts + 1, "Retry budget exhausted");
                }
                return Err(err);
            }
        }
    }
}
