//! Retry logic with exponential backoff
//!
//! This module provides configurable retry logic for transient failures.
//! It implements exponential backoff with optional jitter to prevent thundering herd.
//! A multiplier of 1.0 without jitter gives a fixed-delay policy, which is what the
//! exporter uses for object store close retries.
//!
//! # Example
//!
//! ```no_run
//! use youtube_data::retry::{IsRetryable, with_retry};
//! use youtube_data::config::RetryConfig;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Transient,
//!     Permanent,
//! }
//!
//! impl std::fmt::Display for MyError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{:?}", self)
//!     }
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Transient)
//!     }
//! }
//!
//! # async fn example() -> Result<(), MyError> {
//! let config = RetryConfig::default();
//! let result = with_retry(&config, || async {
//!     // Your operation here
//!     Ok::<_, MyError>(())
//! }).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::UpstreamError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (network timeouts, quota bursts, 5xx) should return `true`.
/// Permanent failures (not found, forbidden, undecodable bodies) should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for UpstreamError {
    fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Transport { source, .. } => source.is_timeout() || source.is_connect(),
            UpstreamError::QuotaExceeded { .. } => true,
            UpstreamError::Status { status, .. } => *status >= 500,
            UpstreamError::NotFound { .. }
            | UpstreamError::Forbidden { .. }
            | UpstreamError::Decode { .. } => false,
        }
    }
}

/// Execute an async operation with exponential backoff retry logic
///
/// `config.max_attempts` is the total number of calls made, so a value of 1
/// disables retrying. Non-retryable errors are returned immediately.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;
    let mut delay = config.initial_delay;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                tracing::warn!(
                    error = %e,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis(),
                    "Operation failed, retrying"
                );

                tokio::time::sleep(next_delay_for(config, delay)).await;

                delay = backoff(config, delay);
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!(
                        error = %e,
                        attempts = attempt,
                        "Operation failed after all retry attempts exhausted"
                    );
                } else {
                    tracing::error!(error = %e, "Operation failed with non-retryable error");
                }
                return Err(e);
            }
        }
    }
}

/// The delay to actually sleep for, with jitter applied when enabled
pub(crate) fn next_delay_for(config: &RetryConfig, delay: Duration) -> Duration {
    if config.jitter {
        add_jitter(delay)
    } else {
        delay
    }
}

/// Grow a delay by the backoff multiplier, capped at `max_delay`
pub(crate) fn backoff(config: &RetryConfig, delay: Duration) -> Duration {
    let next = Duration::from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier);
    next.min(config.max_delay)
}

/// Add random jitter to a delay to prevent thundering herd
///
/// Jitter is uniformly distributed between 0% and 100% of the delay.
/// This means the actual delay will be between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    let jittered_secs = delay.as_secs_f64() * (1.0 + jitter_factor);
    Duration::from_secs_f64(jittered_secs)
}
