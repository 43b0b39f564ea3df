// Forecast Backend Port (Interface)

use crate::domain::{
    DatasetFile, DatasetForecastRequest, ForecastResult, ForecastSeries, SubmissionOutcome,
    UploadTicket,
};
use crate::error::Result;
use async_trait::async_trait;

/// The external forecasting service
///
/// Implementations:
/// - HttpForecastBackend (infra-http): reqwest over HTTPS
/// - mocks::ScriptedBackend: in-memory scripted responses for tests
#[async_trait]
pub trait ForecastBackend: Send + Sync {
    /// `POST /forecast` with the file as a multipart body
    async fn submit_file(&self, file: &DatasetFile) -> Result<SubmissionOutcome>;

    /// `POST /forecasts` with a dataset reference
    async fn submit_dataset(&self, request: &DatasetForecastRequest) -> Result<SubmissionOutcome>;

    /// `GET /forecast/{job_id}`: result-shaped payload including `status`
    async fn fetch_status(&self, job_id: &str) -> Result<ForecastResult>;

    /// `GET /forecasts/{job_id}`: time series and model metrics
    async fn fetch_series(&self, job_id: &str) -> Result<ForecastSeries>;

    /// `POST /datasets/upload`: presigned object-storage target
    async fn request_upload(&self, filename: &str, content_type: &str) -> Result<UploadTicket>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::JobStatus;
    use crate::error::AppError;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// One scripted status response
    #[derive(Debug, Clone)]
    pub enum MockStatus {
        Status(ForecastResult),
        TransportFailure(String),
    }

    impl MockStatus {
        /// Bare payload with the given wire status
        pub fn wire(status: &str) -> Self {
            MockStatus::Status(ForecastResult {
                status: JobStatus::from_wire(status),
                ..ForecastResult::default()
            })
        }
    }

    /// Scripted backend
    ///
    /// Status responses are served in order; once the script is exhausted
    /// the fallback (if any) repeats forever.
    pub struct ScriptedBackend {
        script: Arc<Mutex<VecDeque<MockStatus>>>,
        fallback: Option<MockStatus>,
        submission: Arc<Mutex<Option<SubmissionOutcome>>>,
        status_calls: Arc<Mutex<usize>>,
        submitted: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedBackend {
        pub fn new(script: Vec<MockStatus>) -> Self {
            Self {
                script: Arc::new(Mutex::new(script.into())),
                fallback: None,
                submission: Arc::new(Mutex::new(None)),
                status_calls: Arc::new(Mutex::new(0)),
                submitted: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Backend answering every poll with the same status
        pub fn repeating(status: &str) -> Self {
            Self::new(Vec::new()).with_fallback(MockStatus::wire(status))
        }

        /// Backend answering polls with the given statuses, in order
        pub fn sequence(statuses: &[&str]) -> Self {
            Self::new(statuses.iter().map(|s| MockStatus::wire(s)).collect())
        }

        pub fn with_fallback(mut self, fallback: MockStatus) -> Self {
            self.fallback = Some(fallback);
            self
        }

        pub fn with_submission(self, outcome: SubmissionOutcome) -> Self {
            *self.submission.lock().unwrap() = Some(outcome);
            self
        }

        pub fn status_calls(&self) -> usize {
            *self.status_calls.lock().unwrap()
        }

        /// File names and dataset ids received, in order
        pub fn submitted(&self) -> Vec<String> {
            self.submitted.lock().unwrap().clone()
        }

        fn next_submission(&self) -> Result<SubmissionOutcome> {
            self.submission
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| AppError::Api {
                    status: 500,
                    message: "no submission scripted".to_string(),
                })
        }
    }

    #[async_trait]
    impl ForecastBackend for ScriptedBackend {
        async fn submit_file(&self, file: &DatasetFile) -> Result<SubmissionOutcome> {
            self.submitted.lock().unwrap().push(file.filename.clone());
            self.next_submission()
        }

        async fn submit_dataset(
            &self,
            request: &DatasetForecastRequest,
        ) -> Result<SubmissionOutcome> {
            self.submitted
                .lock()
                .unwrap()
                .push(request.dataset_id.clone());
            self.next_submission()
        }

        async fn fetch_status(&self, job_id: &str) -> Result<ForecastResult> {
            *self.status_calls.lock().unwrap() += 1;

            let next = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .or_else(|| self.fallback.clone());

            match next {
                Some(MockStatus::Status(mut payload)) => {
                    payload.job_id.get_or_insert_with(|| job_id.to_string());
                    Ok(payload)
                }
                Some(MockStatus::TransportFailure(msg)) => Err(AppError::Transport(msg)),
                None => Err(AppError::Transport("status script exhausted".to_string())),
            }
        }

        async fn fetch_series(&self, job_id: &str) -> Result<ForecastSeries> {
            Ok(ForecastSeries {
                job_id: job_id.to_string(),
                status: JobStatus::Completed,
                metrics: Default::default(),
                forecast: Vec::new(),
            })
        }

        async fn request_upload(&self, filename: &str, _content_type: &str) -> Result<UploadTicket> {
            Ok(UploadTicket {
                url: "https://storage.invalid/bucket".to_string(),
                fields: [("key".to_string(), format!("uploads/{}", filename))]
                    .into_iter()
                    .collect(),
                dataset_id: format!("ds-{}", filename),
            })
        }
    }
}
