//! Bounded retry with linear-multiple backoff.
//!
//! The retry combinator takes a pure policy (attempt limit plus backoff
//! function) and a [`Sleeper`] seam instead of calling a runtime timer
//! directly, so the schedule is unit-testable with a fake clock and no
//! real sleeping.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{DEFAULT_MAX_ATTEMPTS, RETRY_BASE_DELAY};
use crate::error_handling::ScrapeError;

/// Pure retry policy: attempt limit and backoff base.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (at least 1).
    pub max_attempts: u32,
    /// Backoff base; the delay after attempt N is `base * N`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: RETRY_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Returns a copy with the given attempt limit (clamped to ≥ 1).
    pub fn with_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Backoff delay to sleep after the given (1-based) failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Timer seam for the retry loop.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspends the current task for the given duration.
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the Tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Runs `operation` under the given retry policy.
///
/// The operation receives the 1-based attempt number. On error the loop
/// records the cause, sleeps `base_delay * attempt`, and tries again until
/// the attempt limit is reached, at which point the last error is wrapped
/// in `ScrapeError::RetriesExhausted`. A successful operation returns
/// immediately, including one producing an empty collection: empty result
/// and failure are distinct outcomes and must not be conflated here.
///
/// # Errors
///
/// Returns `ScrapeError::RetriesExhausted` wrapping the last per-attempt
/// error once `policy.max_attempts` is reached.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut operation: F,
) -> Result<T, ScrapeError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, ScrapeError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error: Option<ScrapeError> = None;

    for attempt in 1..=max_attempts {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) => {
                log::warn!(
                    "attempt {}/{} failed: {} ({})",
                    attempt,
                    max_attempts,
                    error,
                    error.kind()
                );
                last_error = Some(error);
                if attempt < max_attempts {
                    let delay = policy.delay_for(attempt);
                    log::debug!("backing off {:?} before attempt {}", delay, attempt + 1);
                    sleeper.sleep(delay).await;
                }
            }
        }
    }

    Err(ScrapeError::RetriesExhausted {
        attempts: max_attempts,
        source: Box::new(last_error.unwrap_or_else(|| {
            // Unreachable with max_attempts >= 1, but never panic here.
            ScrapeError::Extraction("no attempt recorded an error".to_string())
        })),
    })
}
