//! Fixed-delay retry for per-site visits.

use harvest_core::{RunConfiguration, ScrapingConfig};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// How many times to try an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// Policy with at least one attempt.
    #[must_use]
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// The request's retry count with the configured backoff.
    #[must_use]
    pub fn for_run(run: &RunConfiguration, config: &ScrapingConfig) -> Self {
        Self::new(run.retries, Duration::from_millis(config.retry_backoff_ms))
    }

    /// Total attempts, including the first.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Pause after a failed attempt.
    #[must_use]
    pub fn backoff(&self) -> Duration {
        self.backoff
    }
}

/// Run `task_fn` until it succeeds or the policy runs out of attempts.
///
/// `task_fn` receives the 1-based attempt number. The backoff is slept
/// between failures, never after the last one. Returns the first success
/// or the last error.
pub async fn retry_with_delay<F, Fut, T, E>(
    policy: RetryPolicy,
    label: &str,
    mut task_fn: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match task_fn(attempt).await {
            Ok(result) => return Ok(result),
            Err(e) => {
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    "attempt {}/{} failed for {}: {}",
                    attempt,
                    policy.max_attempts,
                    label,
                    e
                );

                if attempt >= policy.max_attempts {
                    tracing::error!(
                        "all {} attempts failed for {}",
                        policy.max_attempts,
                        label
                    );
                    return Err(e);
                }

                tokio::time::sleep(policy.backoff).await;
                attempt += 1;
            }
        }
    }
}
