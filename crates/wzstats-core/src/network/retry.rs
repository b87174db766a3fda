//! Bounded retries with capped exponential backoff.
//!
//! Used below the upstream client for transport failures only (connection
//! refused, per-attempt timeout, truncated body). Responses that arrive are
//! never retried here; they go straight to the classifier.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, the first one included.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub base_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    /// Spread each delay by a random factor in `0.5..1.5`.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay to wait after the given failed attempt (0-indexed).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(16));
        let capped = self.base_delay.saturating_mul(factor).min(self.max_delay);

        if !self.jitter {
            return capped;
        }

        let spread = rand::rng().random_range(0.5..1.5);
        capped.mul_f64(spread).min(self.max_delay)
    }
}

/// What happened during a retried operation.
#[derive(Debug, Clone, Default)]
pub struct RetryStats {
    pub attempts: u32,
    pub total_delay: Duration,
    pub last_error: Option<String>,
}

/// Run `operation` until it succeeds, fails with an error `should_retry`
/// rejects, or `config.max_attempts` is reached.
pub async fn retry_async<F, Fut, T, E>(
    config: &RetryConfig,
    mut operation: F,
    should_retry: impl Fn(&E) -> bool,
) -> (Result<T, E>, RetryStats)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut stats = RetryStats::default();
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        stats.attempts = attempt + 1;

        let error = match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(attempts = stats.attempts, "Operation succeeded after retry");
                }
                return (Ok(value), stats);
            }
            Err(e) => e,
        };

        stats.last_error = Some(error.to_string());

        if !should_retry(&error) {
            debug!(error = %error, "Error is not retryable");
            return (Err(error), stats);
        }

        if attempt + 1 >= max_attempts {
            warn!(
                attempts = stats.attempts,
                error = %error,
                "All retry attempts exhausted"
            );
            return (Err(error), stats);
        }

        let delay = config.delay_after(attempt);
        stats.total_delay += delay;
        warn!(
            attempt = stats.attempts,
            max_attempts,
            error = %error,
            delay_ms = delay.as_millis() as u64,
            "Attempt failed, retrying"
        );

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
