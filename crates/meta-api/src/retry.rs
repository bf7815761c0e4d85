//! Bounded exponential backoff for upstream calls.
//!
//! A failed attempt `n` (0-indexed) that the predicate deems retryable waits
//! `base_delay * 2^n` before the next attempt. No jitter. Non-retryable
//! errors and the error of the final attempt propagate unchanged.

use metareport_core::error::codes;
use metareport_core::{MetaApiError, ReportError};
use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

pub const BASE_DELAY: Duration = Duration::from_millis(1000);
pub const MAX_RETRIES: u32 = 3;

/// Delay before retrying after failed attempt `attempt`, using [`BASE_DELAY`].
pub fn calculate_backoff_delay(attempt: u32) -> Duration {
    backoff_delay(BASE_DELAY, attempt)
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}

/// Errors that may carry a numeric upstream code.
pub trait ErrorCode {
    fn error_code(&self) -> Option<i64>;
}

impl ErrorCode for MetaApiError {
    fn error_code(&self) -> Option<i64> {
        self.code()
    }
}

impl ErrorCode for ReportError {
    fn error_code(&self) -> Option<i64> {
        match self {
            ReportError::Upstream(e) => e.code(),
            _ => None,
        }
    }
}

/// Default retry predicate: the provider's rate-limit code.
pub fn is_rate_limit_error<E: ErrorCode>(error: &E) -> bool {
    error.error_code() == Some(codes::RATE_LIMIT)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            base_delay: BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &metareport_core::config::RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        backoff_delay(self.base_delay, attempt)
    }

    pub async fn run<T, E, F, Fut>(&self, op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ErrorCode + Debug,
    {
        self.run_with(RetryOptions::default(), op).await
    }

    /// Like `run`, with per-call overrides. Without a `should_retry`
    /// override only rate-limit errors are retried.
    pub async fn run_with<T, E, F, Fut>(&self, options: RetryOptions<E>, op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ErrorCode + Debug,
    {
        let max_retries = options.max_retries.unwrap_or(self.max_retries);
        match options.should_retry {
            Some(predicate) => self.run_with_predicate(max_retries, predicate, op).await,
            None => self.run_with_predicate(max_retries, is_rate_limit_error::<E>, op).await,
        }
    }

    /// Retry loop for any producer; `should_retry` alone decides which
    /// errors are retried.
    pub async fn run_with_predicate<T, E, F, Fut, P>(
        &self,
        max_retries: u32,
        should_retry: P,
        mut op: F,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: Debug,
    {
        let mut attempt = 0u32;

        loop {
            let err = match op().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(attempt = attempt, "Upstream call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            if attempt >= max_retries || !should_retry(&err) {
                return Err(err);
            }

            let delay = self.delay_for(attempt);
            warn!(
                attempt = attempt,
                delay_ms = delay.as_millis() as u64,
                error = ?err,
                "Retryable upstream error, backing off"
            );
            metrics::counter!("meta.insights.retry").increment(1);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// Per-call overrides of the policy.
pub struct RetryOptions<E> {
    pub max_retries: Option<u32>,
    pub should_retry: Option<Box<dyn Fn(&E) -> bool + Send + Sync>>,
}

impl<E> Default for RetryOptions<E> {
    fn default() -> Self {
        Self {
            max_retries: None,
            should_retry: None,
        }
    }
}

impl<E> RetryOptions<E> {
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn should_retry(mut self, predicate: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        self.should_retry = Some(Box::new(predicate));
        self
    }
}

/// Run `op` under the default policy (3 retries, 1000ms base delay).
pub async fn retry_with_backoff<T, E, F, Fut>(op: F, options: RetryOptions<E>) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: ErrorCode + Debug,
{
    RetryPolicy::default().run_with(options, op).await
}

/// Run any fallible producer with the default delays, retrying up to
/// `max_retries` times while `should_retry` accepts the error.
pub async fn retry_with_predicate<T, E, F, Fut, P>(op: F, max_retries: u32, should_retry: P) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: Debug,
{
    RetryPolicy::default()
        .run_with_predicate(max_retries, should_retry, op)
        .await
}
