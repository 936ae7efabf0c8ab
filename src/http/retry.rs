//! Fixed-delay retry for upstream operations.

use log::{debug, warn};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Number of additional attempts after the first one.
pub const MAX_RETRIES: usize = 3;

/// Delay between retry attempts in milliseconds.
pub const RETRY_DELAY_MS: u64 = 1000;

/// Immutable retry configuration, shared by reference between requests.
///
/// Holds no per-call state: every [`RetryPolicy::run`] keeps its own attempt
/// counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: usize,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MAX_RETRIES, Duration::from_millis(RETRY_DELAY_MS))
    }
}

impl RetryPolicy {
    pub fn new(max_retries: usize, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Total number of times an operation may be invoked.
    pub fn max_attempts(&self) -> usize {
        self.max_retries + 1
    }

    /// Runs `operation`, re-invoking it after `delay` while it fails with an
    /// error accepted by `should_retry`.
    ///
    /// Errors rejected by `should_retry` are returned immediately. Once the
    /// retries are used up the last error is returned as is. `cancel` is
    /// checked before every attempt and raced against the attempt in flight;
    /// when it fires the last error is returned, or [`Cancelled`] if no
    /// attempt finished yet.
    pub async fn run<F, Fut, T, E, P>(
        &self,
        operation_name: &str,
        cancel: &CancellationToken,
        should_retry: P,
        operation: F,
    ) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display + From<Cancelled>,
    {
        let max_attempts = self.max_attempts();
        let mut last_error: Option<E> = None;
        let mut attempt = 1;

        loop {
            if cancel.is_cancelled() {
                debug!("{}: cancelled before attempt {}", operation_name, attempt);
                return Err(cancelled(operation_name, last_error));
            }

            // A finished attempt wins over a cancellation that raced it.
            let outcome = tokio::select! {
                biased;
                outcome = operation() => outcome,
                _ = cancel.cancelled() => {
                    debug!("{}: cancelled during attempt {}", operation_name, attempt);
                    return Err(cancelled(operation_name, last_error));
                }
            };

            let e = match outcome {
                Ok(result) => return Ok(result),
                Err(e) => e,
            };

            if !should_retry(&e) {
                debug!("{}: non-retryable error: {}", operation_name, e);
                return Err(e);
            }

            if attempt >= max_attempts {
                debug!(
                    "{}: giving up after {} attempts: {}",
                    operation_name, attempt, e
                );
                return Err(e);
            }

            warn!(
                "{}: attempt {}/{} failed ({}), retrying in {}ms...",
                operation_name,
                attempt,
                max_attempts,
                e,
                self.delay.as_millis()
            );

            let delay = tokio::time::sleep(self.delay);
            last_error = Some(e);
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("{}: cancelled while waiting to retry", operation_name);
                    return Err(cancelled(operation_name, last_error));
                }
                _ = delay => {}
            }

            attempt += 1;
        }
    }
}

/// Cancellation observed before any attempt of an operation finished.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} cancelled")]
pub struct Cancelled {
    pub operation: String,
}

fn cancelled<E: From<Cancelled>>(operation_name: &str, last_error: Option<E>) -> E {
    last_error.unwrap_or_else(|| {
        E::from(Cancelled {
            operation: operation_name.to_string(),
        })
    })
}
