//! Retry policy and clock abstraction for the rate-limited client
//!
//! Every suspension the client performs (pacing, backoff) goes through a
//! [`Clock`] so the schedule can be asserted without real sleeps.

use async_trait::async_trait;
use std::time::Duration;

/// Ceiling for a single backoff sleep
pub const MAX_BACKOFF: Duration = Duration::from_secs(300);

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Attempts per call, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Growth factor between consecutive retries
    pub multiplier: f64,
    /// Retry non-throttling upstream failures as well
    pub retry_unavailable: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_secs(2),
            multiplier: 2.0,
            retry_unavailable: false,
        }
    }
}

impl RetryPolicy {
    /// Backoff after the given zero-based attempt: `base_delay * multiplier^attempt`,
    /// saturating at [`MAX_BACKOFF`]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::try_from_secs_f64(secs).map_or(MAX_BACKOFF, |delay| delay.min(MAX_BACKOFF))
    }

    /// Whether another attempt is allowed after `attempt` (zero-based) failed
    pub fn has_attempt_after(&self, attempt: u32) -> bool {
        attempt.saturating_add(1) < self.max_attempts
    }
}

/// Source of suspension for pacing and backoff
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production clock backed by the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
