// Job Observer - follow a forecast job until it is terminal

mod cancel;
pub mod constants;
mod observation;
mod policy;
mod poll;
mod push;
mod tracker;
mod update;

pub use cancel::{cancel_channel, CancelHandle, CancelToken};
pub use observation::{Observation, UpdateSink};
pub use policy::PollPolicy;
pub use poll::PollObserver;
pub use push::PushObserver;
pub use tracker::JobTracker;
pub use update::{Completion, JobOutcome, JobUpdate};

use crate::domain::JobId;
use serde::{Deserialize, Serialize};

/// Which transport an observer uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Poll,
    Push,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Poll => write!(f, "poll"),
            TransportKind::Push => write!(f, "push"),
        }
    }
}

/// "Observe job until terminal", independent of transport
///
/// Both variants produce the same [`Observation`] stream, so callers do not
/// care which one they hold.
#[derive(Clone)]
pub enum JobObserver {
    Poll(PollObserver),
    Push(PushObserver),
}

impl JobObserver {
    /// Start observing `job_id`. Must be called inside a tokio runtime.
    pub fn observe(&self, job_id: impl Into<JobId>) -> Observation {
        match self {
            JobObserver::Poll(observer) => observer.observe(job_id),
            JobObserver::Push(observer) => observer.observe(job_id),
        }
    }

    pub fn kind(&self) -> TransportKind {
        match self {
            JobObserver::Poll(_) => TransportKind::Poll,
            JobObserver::Push(_) => TransportKind::Push,
        }
    }
}

impl From<PollObserver> for JobObserver {
    fn from(observer: PollObserver) -> Self {
        JobObserver::Poll(observer)
    }
}

impl From<PushObserver> for JobObserver {
    fn from(observer: PushObserver) -> Self {
        JobObserver::Push(observer)
    }
}
