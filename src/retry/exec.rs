//! Retry Execution Module
//!
//! The retry loop itself, in three forms: plain backoff, predicate-driven,
//! and deadline-bounded.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::ResilienceError;
use crate::retry::{backoff_delay_ms, RetryConfig};

// == Retry Outcome ==
/// Terminal result of a retry sequence.
///
/// Failure is carried inside `result` rather than raised, so callers branch
/// without any unwinding across the retry boundary.
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    /// The final attempt's result
    pub result: Result<T, E>,
    /// Number of attempts made, including the successful one
    pub attempts: u32,
    /// Total time spent sleeping between attempts, in milliseconds
    pub total_delay_ms: u64,
}

impl<T, E> RetryOutcome<T, E> {
    /// True when the sequence ended in success.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

// == Retry With Backoff ==
/// Runs `operation` up to `config.max_attempts` times with jittered
/// exponential delay between attempts.
///
/// The final failed attempt is not followed by a sleep; exhaustion returns
/// immediately. The returned outcome always reports how many attempts ran
/// and how long was spent waiting.
pub async fn retry_with_backoff<T, E, F, Fut>(
    mut operation: F,
    config: &RetryConfig,
) -> RetryOutcome<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut total_delay_ms: u64 = 0;
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => {
                return RetryOutcome {
                    result: Ok(value),
                    attempts: attempt + 1,
                    total_delay_ms,
                };
            }
            Err(err) => {
                // Exhausted: surface the last error without a trailing sleep
                if attempt + 1 >= max_attempts {
                    return RetryOutcome {
                        result: Err(err),
                        attempts: attempt + 1,
                        total_delay_ms,
                    };
                }

                let delay = backoff_delay_ms(attempt, config);
                debug!(
                    attempt = attempt + 1,
                    delay_ms = delay,
                    "Attempt failed, backing off"
                );
                total_delay_ms += delay;
                tokio::time::sleep(Duration::from_millis(delay)).await;
                attempt += 1;
            }
        }
    }
}

// == Retry With Condition ==
/// Like [`retry_with_backoff`], but a predicate decides after each failure
/// whether to continue.
///
/// `should_retry` receives the error and the 1-indexed attempt number. When
/// it returns false, or attempts are exhausted, the error propagates to the
/// caller unchanged.
pub async fn retry_with_condition<T, E, F, Fut, P>(
    mut operation: F,
    config: &RetryConfig,
    mut should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&E, u32) -> bool,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let attempt_number = attempt + 1;
                if attempt_number >= max_attempts || !should_retry(&err, attempt_number) {
                    return Err(err);
                }

                let delay = backoff_delay_ms(attempt, config);
                tokio::time::sleep(Duration::from_millis(delay)).await;
                attempt += 1;
            }
        }
    }
}

// == Retry With Timeout ==
/// Races a whole retry sequence against an absolute deadline.
///
/// Whichever settles first wins. An attempt in flight at the deadline is
/// abandoned, not cancelled; its result is simply never observed.
pub async fn retry_with_timeout<T, E, F, Fut>(
    operation: F,
    config: &RetryConfig,
    timeout_ms: u64,
) -> Result<RetryOutcome<T, E>, ResilienceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(
        Duration::from_millis(timeout_ms),
        retry_with_backoff(operation, config),
    )
    .await
    {
        Ok(outcome) => Ok(outcome),
        Err(_) => {
            warn!(timeout_ms, "Retry sequence exceeded its deadline");
            Err(ResilienceError::Timeout(timeout_ms))
        }
    }
}
