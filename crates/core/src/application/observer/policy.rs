// Poll scheduling policy

use super::constants::*;
use std::time::Duration;

/// How often and how long to poll a job
///
/// Delay after poll `n` (1-based):
/// `interval * backoff_factor ^ (n - 1)`, capped at `max_interval`.
/// The default factor of 1.0 gives fixed spacing.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub backoff_factor: f64,
    pub max_interval: Duration,
    /// `None` polls until a terminal status or teardown
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            max_interval: DEFAULT_MAX_POLL_INTERVAL,
            max_attempts: Some(DEFAULT_MAX_POLL_ATTEMPTS),
        }
    }
}

impl PollPolicy {
    /// Fixed spacing with the default cap
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_backoff(mut self, factor: f64, max_interval: Duration) -> Self {
        self.backoff_factor = factor;
        self.max_interval = max_interval;
        self
    }

    /// Delay to wait after `attempts` polls have been issued
    pub fn delay_for(&self, attempts: u32) -> Duration {
        if self.backoff_factor <= 1.0 || attempts <= 1 {
            return self.interval;
        }
        let exponent = i32::try_from(attempts - 1).unwrap_or(i32::MAX);
        let secs = self.interval.as_secs_f64() * self.backoff_factor.powi(exponent);
        let cap = self.max_interval.max(self.interval);
        if !secs.is_finite() || secs >= cap.as_secs_f64() {
            cap
        } else {
            Duration::from_secs_f64(secs)
        }
    }

    /// Whether another poll is allowed after `attempts` polls
    pub fn allows_another(&self, attempts: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempts < max)
    }
}
