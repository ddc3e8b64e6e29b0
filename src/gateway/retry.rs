//! Retry configuration, delay calculation, and the shared retry loop.
//!
//! Only transient errors (a model answering 503 while it warms up, see
//! [`SuggestError::is_transient()`]) are retried. Attempts run strictly in
//! sequence with a sleep in between.

use std::future::Future;
use std::time::Duration;

use crate::{Result, SuggestError};

/// Configuration for retry behaviour on warming-up models.
///
/// The delay before retry `n` (1-based) is
/// `min(max_delay, max(min_delay, estimate × n))`, where `estimate` is the
/// provider's reported warm-up time or `default_estimate`:
///
/// ```rust
/// # use snaptask::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .max_attempts(3)
///     .min_delay(Duration::from_millis(750));
/// assert_eq!(config.delay_for_attempt(2, None), Duration::from_millis(2400));
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial request).
    /// 1 = no retry. Default: 3.
    pub max_attempts: u32,
    /// Lower bound on a single delay. Default: 750ms.
    pub min_delay: Duration,
    /// Upper bound on a single delay. Default: 5s.
    pub max_delay: Duration,
    /// Warm-up estimate when the provider gives none. Default: 1200ms.
    pub default_estimate: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay: Duration::from_millis(750),
            max_delay: Duration::from_secs(5),
            default_estimate: Duration::from_millis(1200),
        }
    }
}

impl RetryConfig {
    /// Create a new config with the default pacing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set maximum attempts (including the initial request).
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the lower bound on a single delay.
    pub fn min_delay(mut self, delay: Duration) -> Self {
        self.min_delay = delay;
        self
    }

    /// Set the upper bound on a single delay.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the estimate used when the provider reports none.
    pub fn default_estimate(mut self, estimate: Duration) -> Self {
        self.default_estimate = estimate;
        self
    }

    /// Delay after failed attempt `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32, estimate: Option<Duration>) -> Duration {
        let scaled = estimate
            .unwrap_or(self.default_estimate)
            .saturating_mul(attempt.max(1));
        scaled.max(self.min_delay).min(self.max_delay)
    }
}

/// Progress notifications from [`with_retry`].
pub(crate) enum RetryEvent<'a, T> {
    /// An attempt finished.
    Attempt {
        attempt: u32,
        result: &'a Result<T>,
    },
    /// A transient failure is about to be retried after `delay`.
    Backoff {
        attempt: u32,
        max_attempts: u32,
        delay: Duration,
        error: &'a SuggestError,
    },
}

/// Execute an async operation with retry logic.
///
/// Retries transient errors up to `config.max_attempts`, pacing with
/// [`RetryConfig::delay_for_attempt`]. Permanent errors and successes are
/// returned immediately; when attempts run out, the last result is returned.
pub(crate) async fn with_retry<F, Fut, T, O>(config: &RetryConfig, mut f: F, mut observe: O) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    O: FnMut(RetryEvent<'_, T>),
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let result = f().await;
        observe(RetryEvent::Attempt {
            attempt,
            result: &result,
        });

        match result {
            Err(e) if e.is_transient() && attempt < max_attempts => {
                let delay = config.delay_for_attempt(attempt, e.estimated_time());
                observe(RetryEvent::Backoff {
                    attempt,
                    max_attempts,
                    delay,
                    error: &e,
                });
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_uses_default_estimate_scaled_by_attempt() {
        let config = RetryConfig::new();
        assert_eq!(config.delay_for_attempt(1, None), Duration::from_millis(1200));
        assert_eq!(config.delay_for_attempt(2, None), Duration::from_millis(2400));
        assert_eq!(config.delay_for_attempt(3, None), Duration::from_millis(3600));
    }

    #[test]
    fn delay_is_clamped() {
        let config = RetryConfig::new();
        assert_eq!(
            config.delay_for_attempt(1, Some(Duration::from_millis(100))),
            Duration::from_millis(750)
        );
        assert_eq!(
            config.delay_for_attempt(2, Some(Duration::from_secs(20))),
            Duration::from_secs(5)
        );
        assert_eq!(
            config.delay_for_attempt(2, Some(Duration::from_secs(2))),
            Duration::from_secs(4)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stops_at_max_attempts_and_returns_last_result() {
        let config = RetryConfig::new();
        let mut calls = 0u32;
        let mut backoffs = Vec::new();

        let result: Result<()> = with_retry(
            &config,
            || {
                calls += 1;
                let n = calls;
                async move {
                    Err(SuggestError::ModelLoading {
                        estimated_time: None,
                        body: format!("attempt {n}"),
                    })
                }
            },
            |event| {
                if let RetryEvent::Backoff { delay, .. } = event {
                    backoffs.push(delay);
                }
            },
        )
        .await;

        assert_eq!(calls, 3);
        assert_eq!(
            backoffs,
            vec![Duration::from_millis(1200), Duration::from_millis(2400)]
        );
        let err = result.unwrap_err();
        assert_eq!(err.body(), Some("attempt 3"));
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let config = RetryConfig::new();
        let mut calls = 0u32;

        let result: Result<()> = with_retry(
            &config,
            || {
                calls += 1;
                async {
                    Err(SuggestError::Api {
                        status: 500,
                        body: "boom".into(),
                    })
                }
            },
            |_| {},
        )
        .await;

        assert_eq!(calls, 1);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn disabled_config_makes_a_single_attempt() {
        let mut calls = 0u32;
        let result: Result<()> = with_retry(
            &RetryConfig::disabled(),
            || {
                calls += 1;
                async {
                    Err(SuggestError::ModelLoading {
                        estimated_time: None,
                        body: String::new(),
                    })
                }
            },
            |_| {},
        )
        .await;

        assert_eq!(calls, 1);
        assert!(result.unwrap_err().is_transient());
    }
}
