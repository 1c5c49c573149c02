//! Retry policy for calls to the vulnerability database

use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, the first one included
    pub max_attempts: u32,
    /// Base unit of the quadratic backoff
    pub base_delay: Duration,
    /// Scale of the random jitter added to each backoff
    pub jitter_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_secs(1),
            jitter_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Retry without sleeping between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            jitter_multiplier: 0.0,
        }
    }

    /// Delay before the 0-based `attempt`: `base·attempt² + base·rand·multiplier·attempt`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let jitter: f64 = rand::thread_rng().gen_range(0.0..1.0);
        self.backoff_with_jitter(attempt, jitter)
    }

    fn backoff_with_jitter(&self, attempt: u32, jitter: f64) -> Duration {
        let attempt = f64::from(attempt);
        let factor = attempt * attempt + jitter * self.jitter_multiplier * attempt;
        self.base_delay.mul_f64(factor.max(0.0))
    }
}

/// Run `operation` up to `max_attempts` times, sleeping before every attempt
///
/// Every error is retried. The last attempt's outcome is returned, even when
/// it is an error.
pub async fn retry_with_backoff<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        let delay = config.backoff(attempt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match operation().await {
            Ok(result) => return Ok(result),
            Err(error) => {
                attempt += 1;
                if attempt >= max_attempts {
                    tracing::warn!(
                        attempts = attempt,
                        error = %error,
                        "Giving up after exhausting retry attempts"
                    );
                    return Err(error);
                }

                tracing::debug!(
                    attempt = attempt,
                    max_attempts = max_attempts,
                    error = %error,
                    "Retrying request with quadratic backoff"
                );
            }
        }
    }
}
