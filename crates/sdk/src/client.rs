//! Forecast Client Implementation

use crate::config::ClientConfig;
use crate::error::{Result, SdkError};
use imhotep_core::application::{
    Completion, JobObserver, JobOutcome, JobSubmitter, Observation, PollObserver, PushObserver,
    TransportKind, UploadService,
};
use imhotep_core::domain::{
    DatasetFile, DatasetForecastRequest, ForecastParameters, ForecastResult, ForecastSeries,
    JobStatus, SubmissionOutcome, FAILED_WITHOUT_MESSAGE,
};
use imhotep_core::port::id_provider::UuidProvider;
use imhotep_core::port::time_provider::SystemTimeProvider;
use imhotep_core::port::{ForecastBackend, ObjectStorage, PushTransport, SessionProvider, TimeProvider};
use imhotep_infra_http::{ApiClient, HttpForecastBackend, PresignedObjectStorage, SseTransport};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Job id reported for a synchronous failure that carried none
pub const UNASSIGNED_JOB_ID: &str = "unassigned";

/// Imhotep forecast client
///
/// Submits datasets, observes jobs and fetches results. The session is
/// passed in explicitly; the client never reads credentials on its own.
///
/// # Example
///
/// ```no_run
/// use imhotep_sdk::{ClientConfig, ForecastClient};
/// use imhotep_core::application::TransportKind;
/// use imhotep_core::port::StaticSession;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let session = Arc::new(StaticSession::new(Some("token".to_string()), None));
/// let client = ForecastClient::connect(ClientConfig::default(), session)?;
///
/// let result = client.forecast_file("sales.csv", TransportKind::Poll).await?;
/// println!("{} forecasts", result.forecasts.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ForecastClient {
    config: ClientConfig,
    backend: Arc<dyn ForecastBackend>,
    submitter: JobSubmitter,
    uploads: Arc<UploadService>,
    poll: PollObserver,
    push: PushObserver,
}

impl ForecastClient {
    /// Build a client backed by the HTTP adapters
    pub fn connect(config: ClientConfig, session: Arc<dyn SessionProvider>) -> Result<Self> {
        config.validate()?;
        let api = ApiClient::new(&config.http(), session, Arc::new(UuidProvider))?;

        debug!(api_url = %config.api_url, "Forecast client configured");

        Ok(Self::from_parts(
            config,
            Arc::new(HttpForecastBackend::new(api.clone())),
            Arc::new(PresignedObjectStorage::new(&api)),
            Arc::new(SseTransport::new(api)),
            Arc::new(SystemTimeProvider),
        ))
    }

    /// Build a client from explicit adapters (tests, custom transports)
    pub fn from_parts(
        config: ClientConfig,
        backend: Arc<dyn ForecastBackend>,
        storage: Arc<dyn ObjectStorage>,
        transport: Arc<dyn PushTransport>,
        clock: Arc<dyn TimeProvider>,
    ) -> Self {
        let poll = PollObserver::new(Arc::clone(&backend), Arc::clone(&clock), config.poll_policy());
        let push = PushObserver::new(transport, clock);
        Self {
            submitter: JobSubmitter::new(Arc::clone(&backend)),
            uploads: Arc::new(UploadService::new(Arc::clone(&backend), storage)),
            config,
            backend,
            poll,
            push,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Upload a spreadsheet as multipart (`POST /forecast`)
    pub async fn submit_file(&self, path: impl AsRef<Path>) -> Result<SubmissionOutcome> {
        let file = read_dataset(path.as_ref()).await?;
        Ok(self.submitter.submit_file(file).await?)
    }

    /// Upload through a presigned object-storage URL, then forecast
    pub async fn upload_presigned(&self, path: impl AsRef<Path>) -> Result<SubmissionOutcome> {
        let file = read_dataset(path.as_ref()).await?;
        Ok(self.uploads.upload_and_forecast(file).await?)
    }

    /// Forecast an existing dataset (`POST /forecasts`)
    pub async fn submit_dataset(
        &self,
        dataset_id: impl Into<String>,
        industry: Option<String>,
    ) -> Result<SubmissionOutcome> {
        let request = DatasetForecastRequest {
            dataset_id: dataset_id.into(),
            parameters: ForecastParameters { industry },
        };
        Ok(self
            .submitter
            .submit(imhotep_core::application::ForecastRequest::Dataset(request))
            .await?)
    }

    /// Forecast the configured sample dataset
    pub async fn submit_sample(&self, industry: Option<String>) -> Result<SubmissionOutcome> {
        self.submit_dataset(self.config.sample_dataset_id.clone(), industry)
            .await
    }

    /// One status poll (`GET /forecast/{job_id}`)
    pub async fn status(&self, job_id: &str) -> Result<ForecastResult> {
        Ok(self.backend.fetch_status(job_id).await?)
    }

    /// Time series and model metrics (`GET /forecasts/{job_id}`)
    pub async fn series(&self, job_id: &str) -> Result<ForecastSeries> {
        Ok(self.backend.fetch_series(job_id).await?)
    }

    pub fn observer(&self, kind: TransportKind) -> JobObserver {
        match kind {
            TransportKind::Poll => JobObserver::Poll(self.poll.clone()),
            TransportKind::Push => JobObserver::Push(self.push.clone()),
        }
    }

    /// Start observing a job; drop the observation to stop
    pub fn observe(&self, job_id: &str, kind: TransportKind) -> Observation {
        self.observer(kind).observe(job_id)
    }

    /// Resolve a submission to its final result
    ///
    /// A synchronous result is returned as is and a synchronous failure is
    /// [`SdkError::JobFailed`]. An accepted job is observed until terminal;
    /// when the push transport only reports completion the result is
    /// fetched by status (see [`ForecastClient::completed_result`]).
    pub async fn wait_for_result(
        &self,
        outcome: SubmissionOutcome,
        kind: TransportKind,
    ) -> Result<ForecastResult> {
        let job_id = match outcome {
            SubmissionOutcome::Ready(result) => return Ok(*result),
            SubmissionOutcome::Failed { job_id, error } => {
                return Err(SdkError::JobFailed {
                    job_id: job_id.unwrap_or_else(|| UNASSIGNED_JOB_ID.to_string()),
                    message: error,
                })
            }
            SubmissionOutcome::Accepted { job_id } => job_id,
        };

        info!(job_id = %job_id, transport = %kind, "Waiting for forecast job");
        match self.observe(&job_id, kind).outcome().await? {
            JobOutcome::Completed(Completion::Result(result)) => Ok(*result),
            JobOutcome::Completed(Completion::Stream(data)) => {
                debug!(job_id = %job_id, forecast_id = %data.forecast_id, "Fetching completed result");
                self.completed_result(&job_id).await
            }
            JobOutcome::Failed(message) => Err(SdkError::JobFailed { job_id, message }),
        }
    }

    /// Fetch the result of a job the push channel reported complete
    ///
    /// The status endpoint may lag behind the push channel. A snapshot that
    /// is not yet a valid `completed` result hands over to the poll
    /// observer, which runs until the job is terminal.
    pub async fn completed_result(&self, job_id: &str) -> Result<ForecastResult> {
        let snapshot = self.status(job_id).await?;
        match snapshot.status {
            JobStatus::Completed if snapshot.validate().is_ok() => return Ok(snapshot),
            JobStatus::Failed => {
                return Err(SdkError::JobFailed {
                    job_id: job_id.to_string(),
                    message: snapshot
                        .error
                        .filter(|message| !message.trim().is_empty())
                        .unwrap_or_else(|| FAILED_WITHOUT_MESSAGE.to_string()),
                })
            }
            _ => {}
        }

        warn!(
            job_id = %job_id,
            status = %snapshot.status,
            "Status lags behind push completion, polling until terminal"
        );
        match self.poll.observe(job_id).outcome().await? {
            JobOutcome::Completed(completion) => completion.result().cloned().ok_or_else(|| {
                SdkError::UnexpectedResponse(format!("job {} completed without a result", job_id))
            }),
            JobOutcome::Failed(message) => Err(SdkError::JobFailed {
                job_id: job_id.to_string(),
                message,
            }),
        }
    }

    /// Submit a file and wait for its result
    pub async fn forecast_file(
        &self,
        path: impl AsRef<Path>,
        kind: TransportKind,
    ) -> Result<ForecastResult> {
        let outcome = self.submit_file(path).await?;
        self.wait_for_result(outcome, kind).await
    }
}

/// Read a dataset file from disk
pub async fn read_dataset(path: &Path) -> Result<DatasetFile> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| SdkError::Validation(format!("not a file path: {}", path.display())))?
        .to_string();
    let bytes = tokio::fs::read(path).await?;
    DatasetFile::new(filename, bytes).map_err(|e| SdkError::Validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use imhotep_core::domain::{ForecastItem, Level};
    use imhotep_core::port::forecast_backend::mocks::{MockStatus, ScriptedBackend};
    use imhotep_core::port::object_storage::mocks::RecordingStorage;
    use imhotep_core::port::push_transport::mocks::ScriptedTransport;
    use tokio_test::{assert_err, assert_ok};

    const COMPLETE: &str =
        r#"{"type":"complete","data":{"forecastId":"f","metrics":{},"timestamp":"t"}}"#;

    fn client(backend: Arc<ScriptedBackend>, transport: Arc<ScriptedTransport>) -> ForecastClient {
        ForecastClient::from_parts(
            ClientConfig::default(),
            backend,
            Arc::new(RecordingStorage::new()),
            transport,
            Arc::new(SystemTimeProvider),
        )
    }

    fn accepted(job_id: &str) -> SubmissionOutcome {
        SubmissionOutcome::Accepted {
            job_id: job_id.to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_result_by_polling() {
        let backend = Arc::new(ScriptedBackend::sequence(&["pending", "completed"]));
        let client = client(backend.clone(), Arc::new(ScriptedTransport::messages(&[])));

        let result = client
            .wait_for_result(accepted("job-1"), TransportKind::Poll)
            .await
            .unwrap();

        assert_eq!(result.status, JobStatus::Completed);
        assert_eq!(backend.status_calls(), 2);
    }

    #[tokio::test]
    async fn test_push_completion_fetches_result() {
        let backend = Arc::new(ScriptedBackend::sequence(&["completed"]));
        let transport = Arc::new(ScriptedTransport::messages(&[
            r#"{"type":"complete","data":{"forecastId":"f","metrics":{},"timestamp":"t"}}"#,
        ]));
        let client = client(backend.clone(), transport);

        let result = client
            .wait_for_result(accepted("job-2"), TransportKind::Push)
            .await
            .unwrap();

        assert_eq!(result.job_id.as_deref(), Some("job-2"));
        assert_eq!(backend.status_calls(), 1);
    }

    #[tokio::test]
    async fn test_job_failure_is_error_with_message() {
        let backend = Arc::new(ScriptedBackend::new(vec![MockStatus::Status(ForecastResult {
            status: JobStatus::Failed,
            error: Some("not enough history".to_string()),
            ..ForecastResult::default()
        })]));
        let client = client(backend, Arc::new(ScriptedTransport::messages(&[])));

        let err = client
            .wait_for_result(accepted("job-3"), TransportKind::Poll)
            .await
            .unwrap_err();

        match err {
            SdkError::JobFailed { job_id, message } => {
                assert_eq!(job_id, "job-3");
                assert_eq!(message, "not enough history");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_synchronous_result_skips_observation() {
        let backend = Arc::new(ScriptedBackend::new(Vec::new()));
        let client = client(backend.clone(), Arc::new(ScriptedTransport::messages(&[])));

        let result = client
            .wait_for_result(
                SubmissionOutcome::Ready(Box::new(ForecastResult::default())),
                TransportKind::Poll,
            )
            .await
            .unwrap();

        assert!(!result.has_content());
        assert_eq!(backend.status_calls(), 0);
    }

    #[tokio::test]
    async fn test_sample_uses_configured_dataset() {
        let backend = Arc::new(ScriptedBackend::new(Vec::new()).with_submission(accepted("job-4")));
        let client = client(backend.clone(), Arc::new(ScriptedTransport::messages(&[])));

        let outcome = client.submit_sample(None).await.unwrap();

        assert_eq!(outcome.job_id(), Some("job-4"));
        assert_eq!(backend.submitted(), vec!["sample-dataset-id".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let client = client(
            Arc::new(ScriptedBackend::new(Vec::new())),
            Arc::new(ScriptedTransport::messages(&[])),
        );

        let err = client.submit_file("/nonexistent/sales.csv").await.unwrap_err();
        assert!(matches!(err, SdkError::Io(_)));
    }

    #[tokio::test]
    async fn test_api_error_keeps_status() {
        // No submission scripted: the mock backend answers 500
        let backend = Arc::new(ScriptedBackend::new(Vec::new()));
        let client = client(backend, Arc::new(ScriptedTransport::messages(&[])));

        let err = client.submit_dataset("ds-1", None).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_synchronous_failure_is_job_failed() {
        let backend = Arc::new(ScriptedBackend::new(Vec::new()));
        let client = client(backend.clone(), Arc::new(ScriptedTransport::messages(&[])));
        let outcome = assert_ok!(SubmissionOutcome::from_response(serde_json::json!({
            "job_id": "job-9",
            "status": "failed",
            "error": "dataset has no date column"
        })));

        let err = assert_err!(client.wait_for_result(outcome, TransportKind::Poll).await);

        match err {
            SdkError::JobFailed { job_id, message } => {
                assert_eq!(job_id, "job-9");
                assert_eq!(message, "dataset has no date column");
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(backend.status_calls(), 0);
    }

    #[tokio::test]
    async fn test_synchronous_failure_without_job_id() {
        let client = client(
            Arc::new(ScriptedBackend::new(Vec::new())),
            Arc::new(ScriptedTransport::messages(&[])),
        );
        let outcome = SubmissionOutcome::Failed {
            job_id: None,
            error: FAILED_WITHOUT_MESSAGE.to_string(),
        };

        let err = assert_err!(client.wait_for_result(outcome, TransportKind::Push).await);

        assert!(matches!(
            err,
            SdkError::JobFailed { ref job_id, ref message }
                if job_id == UNASSIGNED_JOB_ID && message == FAILED_WITHOUT_MESSAGE
        ));
    }

    #[test]
    fn test_queued_submission_without_job_id_is_rejected() {
        let err = SubmissionOutcome::from_response(serde_json::json!({"status": "queued"}))
            .map_err(|e| SdkError::from(imhotep_core::AppError::from(e)));

        let err = assert_err!(err);
        assert!(matches!(err, SdkError::UnexpectedResponse(ref msg) if msg.contains("no job_id")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_status_after_push_completion_falls_back_to_polling() {
        let backend = Arc::new(ScriptedBackend::sequence(&["running", "running", "completed"]));
        let transport = Arc::new(ScriptedTransport::messages(&[COMPLETE]));
        let client = client(backend.clone(), transport);

        let result = assert_ok!(
            client
                .wait_for_result(accepted("job-5"), TransportKind::Push)
                .await
        );

        assert_eq!(result.status, JobStatus::Completed);
        assert_eq!(result.job_id.as_deref(), Some("job-5"));
        // One lagging fetch, then polls until completed
        assert_eq!(backend.status_calls(), 3);
    }

    #[tokio::test]
    async fn test_failed_status_after_push_completion_is_job_failed() {
        let backend = Arc::new(ScriptedBackend::new(vec![MockStatus::Status(ForecastResult {
            status: JobStatus::Failed,
            ..ForecastResult::default()
        })]));
        let client = client(backend.clone(), Arc::new(ScriptedTransport::messages(&[COMPLETE])));

        let err = assert_err!(
            client
                .wait_for_result(accepted("job-6"), TransportKind::Push)
                .await
        );

        assert!(matches!(
            err,
            SdkError::JobFailed { ref message, .. } if message == FAILED_WITHOUT_MESSAGE
        ));
        assert_eq!(backend.status_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_completed_snapshot_is_not_returned() {
        let mut invalid = ForecastResult {
            status: JobStatus::Completed,
            ..ForecastResult::default()
        };
        invalid.forecasts.push(ForecastItem {
            sku: "SKU-1".to_string(),
            current_stock: 0.0,
            predicted_demand: -1.0,
            risk_level: Level::High,
            recommendation: String::new(),
            potential_revenue_impact: 0.0,
        });
        let backend = Arc::new(ScriptedBackend::new(vec![
            MockStatus::Status(invalid.clone()),
            MockStatus::Status(invalid),
        ]));
        let client = client(backend.clone(), Arc::new(ScriptedTransport::messages(&[COMPLETE])));

        let err = assert_err!(client.completed_result("job-7").await);

        // The poll observer rejects the same invalid payload
        assert!(matches!(
            err,
            SdkError::Observation(imhotep_core::domain::ObservationError::Protocol(_))
        ));
        assert_eq!(backend.status_calls(), 2);
    }
}
