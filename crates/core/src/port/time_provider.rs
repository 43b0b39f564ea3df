// Time Provider Port (for testability)

use chrono::{DateTime, Utc};

/// Time provider interface (allows mocking in tests)
pub trait TimeProvider: Send + Sync {
    /// Current wall-clock time
    fn now(&self) -> DateTime<Utc>;

    /// Current time in milliseconds since epoch
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// System time provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock advanced by hand (tests)
pub struct ManualTimeProvider {
    millis: std::sync::atomic::AtomicI64,
}

impl ManualTimeProvider {
    pub fn new(start_millis: i64) -> Self {
        Self {
            millis: std::sync::atomic::AtomicI64::new(start_millis),
        }
    }

    pub fn advance_millis(&self, delta: i64) {
        self.millis
            .fetch_add(delta, std::sync::atomic::Ordering::SeqCst);
    }
}

impl TimeProvider for ManualTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.millis.load(std::sync::atomic::Ordering::SeqCst);
        DateTime::from_timestamp_millis(millis).unwrap_or_default()
    }
}
