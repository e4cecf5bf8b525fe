//! Exponential backoff for model calls

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio_retry2::strategy::{jitter, ExponentialBackoff};
use tokio_retry2::{Retry, RetryError};
use tracing::warn;

/// How failed calls are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 = single attempt)
    pub max_retries: u32,

    /// Delay before the first retry
    pub base_delay: Duration,

    /// Upper bound for any single delay
    pub max_delay: Duration,

    /// Whether delays are randomized
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2)
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            jitter: true,
        }
    }

    /// Single attempt, no waiting
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: false,
        }
    }

    pub fn with_base_delay_ms(mut self, ms: u64) -> Self {
        self.base_delay = Duration::from_millis(ms);
        self
    }

    pub fn with_max_delay_ms(mut self, ms: u64) -> Self {
        self.max_delay = Duration::from_millis(ms);
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    /// Delays between attempts, one per retry
    ///
    /// Starts at `base_delay`, grows exponentially and never exceeds
    /// `max_delay`.
    pub fn strategy(&self) -> impl Iterator<Item = Duration> {
        let randomize = self.jitter;
        ExponentialBackoff::from_millis(self.base_delay.as_millis() as u64)
            .max_delay(self.max_delay)
            .map(move |delay| if randomize { jitter(delay) } else { delay })
            .take(self.max_retries as usize)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or
    /// retries are exhausted. Returns the value and the number of attempts.
    pub async fn run<T, E, F, Fut>(
        &self,
        label: &str,
        is_retryable: impl Fn(&E) -> bool,
        mut op: F,
    ) -> Result<(T, u32), E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let attempts = AtomicU32::new(0);
        let max_attempts = self.max_retries + 1;

        let value = Retry::spawn(self.strategy(), || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            let call = op();
            let is_retryable = &is_retryable;
            async move {
                match call.await {
                    Ok(value) => Ok(value),
                    Err(err) if is_retryable(&err) => {
                        warn!(
                            "{} failed (attempt {}/{}): {}",
                            label, attempt, max_attempts, err
                        );
                        Err(RetryError::Transient {
                            err,
                            retry_after: None,
                        })
                    }
                    Err(err) => Err(RetryError::Permanent(err)),
                }
            }
        })
        .await?;

        Ok((value, attempts.load(Ordering::SeqCst)))
    }
}
