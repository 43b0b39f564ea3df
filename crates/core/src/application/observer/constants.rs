// Observer constants (no magic values)
use std::time::Duration;

/// Delay between status polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Upper bound on the poll delay when backoff is enabled
pub const DEFAULT_MAX_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Poll cap: one hour at the default interval
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 720;

/// Fixed spacing (no backoff)
pub const DEFAULT_BACKOFF_FACTOR: f64 = 1.0;

/// Buffered updates between the observation task and its consumer
pub const UPDATE_CHANNEL_CAPACITY: usize = 32;
