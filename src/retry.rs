//! Backoff for translation API calls.
//!
//! Only the backends retry; the reconciliation core never does. A call is
//! tried again when its error is retryable (rate limit, server error,
//! transport) after the wait the server asked for through `Retry-After`,
//! or else after a delay that doubles with every failure.

use crate::translator::TranslateError;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// How many times a backend calls an API and how long it waits in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included (never below 1)
    pub max_attempts: u32,
    /// Wait after the first failure
    pub base_delay: Duration,
    /// Upper bound on any wait, `Retry-After` included
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// Wait before retrying after failed attempt number `failed` (1-based).
    pub fn delay_after(&self, failed: u32, error: &TranslateError) -> Duration {
        let delay = error.retry_after().unwrap_or_else(|| {
            let doublings = failed.saturating_sub(1).min(16);
            self.base_delay.saturating_mul(1u32 << doublings)
        });
        delay.min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    /// 3 attempts waiting 1s then 2s; a `Retry-After` of up to 30s is honoured
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1), Duration::from_secs(30))
    }
}

/// Send `request` until it succeeds, fails with an error that is not worth
/// retrying, or runs out of attempts. The last error is returned.
pub async fn send_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    mut request: F,
) -> Result<T, TranslateError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TranslateError>>,
{
    let mut attempt = 1;

    loop {
        match request().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{}: succeeded on attempt {}/{}", what, attempt, policy.max_attempts);
                }
                return Ok(value);
            }
            Err(e) if !e.is_retryable() => {
                debug!("{}: not retrying: {}", what, e);
                return Err(e);
            }
            Err(e) if attempt >= policy.max_attempts => {
                warn!("{}: giving up after {} attempts: {}", what, attempt, e);
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_after(attempt, &e);
                warn!(
                    "{}: attempt {}/{} failed ({}), retrying in {:?}",
                    what, attempt, policy.max_attempts, e, delay
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
