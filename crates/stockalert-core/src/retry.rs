//! When and how long to wait before another attempt.
//!
//! Only transport failures and 5xx responses are retried on a backoff
//! schedule. A 429 is handled by [`RateLimitRetry`] instead.

use std::time::Duration;

use crate::error::StockAlertError;

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    Fixed { delay: Duration },
    /// `base * factor^attempt`, never longer than `max`. With `jitter` the
    /// delay is spread uniformly over +/- half its length.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    /// 1s, 2s, 4s, 8s, then 10s flat.
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_secs(1),
            factor: 2.0,
            max: Duration::from_secs(10),
            jitter: false,
        }
    }
}

impl Backoff {
    /// Wait after failed attempt `attempt` (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        let (base, factor, max, jitter) = match self {
            Self::Fixed { delay } => return delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => (base, factor, max, jitter),
        };

        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let scaled = (base.as_secs_f64() * factor.powi(exponent)).min(max.as_secs_f64());
        let delay = Duration::from_secs_f64(scaled);
        if !jitter {
            return delay;
        }

        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        let spread = millis / 2;
        let low = millis - spread;
        Duration::from_millis(fastrand::u64(low..=millis.saturating_add(spread)))
    }
}

/// What to do when the server answers 429.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RateLimitRetry {
    /// Surface the rate-limit error to the caller immediately.
    #[default]
    Propagate,
    /// Sleep for the server's `Retry-After` and try once more, provided the
    /// wait does not exceed `max_wait`.
    WaitAndRetry { max_wait: Duration },
}

/// Outcome of consulting the policy after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    GiveUp,
}

/// Configuration for the automatic retry mechanism.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    /// Total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
    pub rate_limit: RateLimitRetry,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Backoff::default(),
            rate_limit: RateLimitRetry::default(),
        }
    }
}

impl RetryConfig {
    pub fn exponential(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
            ..Self::default()
        }
    }

    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub const fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }

    /// Decides whether attempt `attempt` (0-based) may be followed by another.
    ///
    /// `rate_limit_retried` is true once a 429 has already been waited out
    /// during the current call; rate limits are waited out at most once.
    pub fn decide(
        &self,
        error: &StockAlertError,
        attempt: u32,
        rate_limit_retried: bool,
    ) -> RetryDecision {
        if attempt >= self.max_retries {
            return RetryDecision::GiveUp;
        }

        if let StockAlertError::RateLimit { retry_after, .. } = error {
            return match self.rate_limit {
                RateLimitRetry::WaitAndRetry { max_wait }
                    if !rate_limit_retried && *retry_after <= max_wait =>
                {
                    RetryDecision::RetryAfter(*retry_after)
                }
                _ => RetryDecision::GiveUp,
            };
        }

        if error.retryable() {
            RetryDecision::RetryAfter(self.delay_for_attempt(attempt))
        } else {
            RetryDecision::GiveUp
        }
    }
}
