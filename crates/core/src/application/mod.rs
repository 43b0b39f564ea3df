// Application Layer - Use Cases and Business Logic

pub mod observer;
pub mod render;
pub mod submitter;
pub mod upload;

// Re-exports
pub use observer::{
    Completion, JobObserver, JobOutcome, JobUpdate, Observation, PollObserver, PollPolicy,
    PushObserver, TransportKind,
};
pub use render::ResultView;
pub use submitter::{ForecastRequest, JobSubmitter};
pub use upload::UploadService;
