// Domain Layer - Pure forecast model and job lifecycle

pub mod error;
pub mod job;
pub mod observation;
pub mod result;
pub mod series;
pub mod stream_event;
pub mod submission;

// Re-exports
pub use error::DomainError;
pub use job::{ForecastJob, JobId, JobStatus, ObserverState, FAILED_WITHOUT_MESSAGE};
pub use observation::ObservationError;
pub use result::{
    ForecastInsight, ForecastItem, ForecastResult, ForecastSummary, InsightType, Level, Priority,
    RiskLevel,
};
pub use series::{ForecastDataPoint, ForecastMetrics, ForecastSeries};
pub use stream_event::{CompleteData, ErrorData, ProgressData, StreamEvent, UpdateData};
pub use submission::{
    content_type_for, DatasetFile, DatasetForecastRequest, ForecastParameters, SubmissionOutcome,
    UploadRequest, UploadTicket, DEFAULT_SAMPLE_DATASET_ID,
};
