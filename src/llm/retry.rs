//! Bounded exponential backoff retry for summarization calls.

use std::future::Future;
use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use tracing::warn;

const INITIAL_INTERVAL_SECS: u64 = 1;
const MAX_INTERVAL_SECS: u64 = 30;

/// How many times to try an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Never less than 1.
    pub max_attempts: u32,
}

impl RetryPolicy {
    /// A single attempt and no retries.
    pub const fn none() -> Self {
        Self { max_attempts: 1 }
    }

    /// One attempt plus up to `retries` retries.
    pub const fn with_retries(retries: u32) -> Self {
        Self {
            max_attempts: retries.saturating_add(1),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Retry an async operation with exponential backoff.
///
/// `attempt` is called up to `policy.max_attempts` times. Errors for which
/// `is_transient` returns false are returned immediately. When a retry
/// budget greater than one is used up, `wrap_exhausted` converts the last
/// error (with the attempt count) into the caller's exhausted variant.
pub async fn retry_with_backoff<T, E, Fut, F, P, W>(
    policy: RetryPolicy,
    mut attempt: F,
    is_transient: P,
    wrap_exhausted: W,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    W: FnOnce(E, u32) -> E,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut backoff = ExponentialBackoff {
        initial_interval: Duration::from_secs(INITIAL_INTERVAL_SECS),
        max_interval: Duration::from_secs(MAX_INTERVAL_SECS),
        max_elapsed_time: None,
        ..Default::default()
    };

    let mut attempts = 0;

    loop {
        attempts += 1;

        let error = match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if !is_transient(&error) || max_attempts == 1 {
            return Err(error);
        }

        if attempts >= max_attempts {
            return Err(wrap_exhausted(error, attempts));
        }

        if let Some(wait_duration) = backoff.next_backoff() {
            warn!(
                attempt = attempts,
                max_attempts,
                wait_ms = wait_duration.as_millis() as u64,
                "Transient failure, retrying: {error}"
            );
            tokio::time::sleep(wait_duration).await;
        }
    }
}
