// Job Submitter - start a forecast from a file or a dataset reference

use crate::domain::{DatasetFile, DatasetForecastRequest, SubmissionOutcome};
use crate::error::Result;
use crate::port::ForecastBackend;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What to forecast
#[derive(Debug, Clone)]
pub enum ForecastRequest {
    /// Spreadsheet uploaded as multipart to `POST /forecast`
    File(DatasetFile),
    /// Existing dataset (or the sample) via `POST /forecasts`
    Dataset(DatasetForecastRequest),
}

impl ForecastRequest {
    fn validate(&self) -> Result<()> {
        match self {
            ForecastRequest::File(file) => file.validate()?,
            ForecastRequest::Dataset(request) => request.validate()?,
        }
        Ok(())
    }

    fn describe(&self) -> &str {
        match self {
            ForecastRequest::File(file) => &file.filename,
            ForecastRequest::Dataset(request) => &request.dataset_id,
        }
    }
}

/// Submits forecast requests; no retry at this layer
#[derive(Clone)]
pub struct JobSubmitter {
    backend: Arc<dyn ForecastBackend>,
}

impl JobSubmitter {
    pub fn new(backend: Arc<dyn ForecastBackend>) -> Self {
        Self { backend }
    }

    /// Submit a request
    ///
    /// Validation happens before any network call. The caller observes the
    /// job when the outcome is [`SubmissionOutcome::Accepted`].
    pub async fn submit(&self, request: ForecastRequest) -> Result<SubmissionOutcome> {
        request.validate()?;
        debug!(target_name = %request.describe(), "Submitting forecast request");

        let outcome = match &request {
            ForecastRequest::File(file) => self.backend.submit_file(file).await?,
            ForecastRequest::Dataset(dataset) => self.backend.submit_dataset(dataset).await?,
        };

        match &outcome {
            SubmissionOutcome::Accepted { job_id } => {
                info!(job_id = %job_id, target_name = %request.describe(), "Forecast job accepted");
            }
            SubmissionOutcome::Ready(result) => {
                result.validate()?;
                info!(
                    target_name = %request.describe(),
                    forecasts = result.forecasts.len(),
                    "Forecast returned synchronously"
                );
            }
            SubmissionOutcome::Failed { job_id, error } => {
                warn!(
                    job_id = ?job_id,
                    target_name = %request.describe(),
                    error = %error,
                    "Forecast job failed on submission"
                );
            }
        }

        Ok(outcome)
    }

    pub async fn submit_file(&self, file: DatasetFile) -> Result<SubmissionOutcome> {
        self.submit(ForecastRequest::File(file)).await
    }

    /// Forecast over the sample dataset for an industry
    pub async fn submit_sample(&self, industry: Option<String>) -> Result<SubmissionOutcome> {
        self.submit(ForecastRequest::Dataset(DatasetForecastRequest::sample(
            industry,
        )))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecastItem, ForecastResult, JobStatus, Level};
    use crate::error::AppError;
    use crate::port::forecast_backend::mocks::ScriptedBackend;
    use tokio_test::{assert_err, assert_ok};

    fn csv(name: &str) -> DatasetFile {
        DatasetFile::new(name, b"date,sku,units\n2024-01-01,A,3\n".to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_accepted_job_returns_id() {
        let backend = Arc::new(ScriptedBackend::new(Vec::new()).with_submission(
            SubmissionOutcome::Accepted {
                job_id: "job-42".to_string(),
            },
        ));
        let submitter = JobSubmitter::new(backend.clone());

        let outcome = assert_ok!(submitter.submit_file(csv("sales.csv")).await);

        assert_eq!(outcome.job_id(), Some("job-42"));
        assert_eq!(backend.submitted(), vec!["sales.csv".to_string()]);
    }

    #[tokio::test]
    async fn test_sample_uses_default_dataset() {
        let backend = Arc::new(ScriptedBackend::new(Vec::new()).with_submission(
            SubmissionOutcome::Ready(Box::new(ForecastResult {
                status: JobStatus::Completed,
                ..ForecastResult::default()
            })),
        ));
        let submitter = JobSubmitter::new(backend.clone());

        let outcome = submitter
            .submit_sample(Some("retail".to_string()))
            .await
            .unwrap();

        assert!(matches!(outcome, SubmissionOutcome::Ready(_)));
        assert_eq!(backend.submitted(), vec!["sample-dataset-id".to_string()]);
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_backend() {
        let backend = Arc::new(ScriptedBackend::new(Vec::new()));
        let submitter = JobSubmitter::new(backend.clone());

        let err = submitter
            .submit(ForecastRequest::Dataset(DatasetForecastRequest::new("  ")))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Domain(_)));
        assert!(backend.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_backend_error_is_surfaced() {
        // No submission scripted: the mock answers with an API error
        let backend = Arc::new(ScriptedBackend::new(Vec::new()));
        let submitter = JobSubmitter::new(backend);

        let err = assert_err!(submitter.submit_file(csv("sales.csv")).await);

        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_failed_submission_is_returned_as_failure() {
        let backend = Arc::new(ScriptedBackend::new(Vec::new()).with_submission(
            SubmissionOutcome::Failed {
                job_id: Some("job-9".to_string()),
                error: "dataset has no date column".to_string(),
            },
        ));

        let outcome = assert_ok!(JobSubmitter::new(backend).submit_file(csv("sales.csv")).await);

        assert!(matches!(
            outcome,
            SubmissionOutcome::Failed { ref error, .. } if error == "dataset has no date column"
        ));
    }

    #[tokio::test]
    async fn test_invalid_synchronous_result_is_rejected() {
        let result = ForecastResult {
            status: JobStatus::Completed,
            forecasts: vec![ForecastItem {
                sku: "SKU-9".to_string(),
                current_stock: 1.0,
                predicted_demand: f64::NAN,
                risk_level: Level::Low,
                recommendation: String::new(),
                potential_revenue_impact: 0.0,
            }],
            ..ForecastResult::default()
        };
        let backend = Arc::new(
            ScriptedBackend::new(Vec::new()).with_submission(SubmissionOutcome::Ready(Box::new(result))),
        );

        let err = JobSubmitter::new(backend)
            .submit_file(csv("sales.xlsx"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("SKU-9"));
    }
}
