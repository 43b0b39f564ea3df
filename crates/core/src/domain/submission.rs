// Submission Model - what goes to the backend and what comes back

use super::error::{DomainError, Result};
use super::job::{JobId, JobStatus, FAILED_WITHOUT_MESSAGE};
use super::result::ForecastResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sample dataset used when no dataset id is given
pub const DEFAULT_SAMPLE_DATASET_ID: &str = "sample-dataset-id";

/// Accepted spreadsheet formats: (extension, content type)
pub const ACCEPTED_FORMATS: [(&str, &str); 3] = [
    ("csv", "text/csv"),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
];

/// A dataset file to upload
#[derive(Debug, Clone)]
pub struct DatasetFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl DatasetFile {
    /// Build a dataset file, inferring the content type from the extension
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let filename = filename.into();
        let content_type = content_type_for(&filename).ok_or_else(|| {
            DomainError::ValidationError(format!(
                "unsupported file type for {}; expected one of .csv, .xls, .xlsx",
                filename
            ))
        })?;
        let file = Self {
            filename,
            content_type: content_type.to_string(),
            bytes,
        };
        file.validate()?;
        Ok(file)
    }

    pub fn validate(&self) -> Result<()> {
        if self.filename.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "filename cannot be empty".to_string(),
            ));
        }
        if content_type_for(&self.filename).is_none() {
            return Err(DomainError::ValidationError(format!(
                "unsupported file type for {}; expected one of .csv, .xls, .xlsx",
                self.filename
            )));
        }
        if self.bytes.is_empty() {
            return Err(DomainError::ValidationError(format!(
                "{} is empty",
                self.filename
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Content type for an accepted file name, by extension
pub fn content_type_for(filename: &str) -> Option<&'static str> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ACCEPTED_FORMATS
        .iter()
        .find(|(accepted, _)| *accepted == ext)
        .map(|(_, content_type)| *content_type)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}

/// JSON body of `POST /forecasts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetForecastRequest {
    pub dataset_id: String,
    #[serde(default)]
    pub parameters: ForecastParameters,
}

impl DatasetForecastRequest {
    pub fn new(dataset_id: impl Into<String>) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            parameters: ForecastParameters::default(),
        }
    }

    /// Forecast over the sample dataset for an industry
    pub fn sample(industry: Option<String>) -> Self {
        Self {
            dataset_id: DEFAULT_SAMPLE_DATASET_ID.to_string(),
            parameters: ForecastParameters { industry },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.dataset_id.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "dataset_id cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// What a submission produced
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// Asynchronous job to observe
    Accepted { job_id: JobId },
    /// The backend answered synchronously with a full result
    Ready(Box<ForecastResult>),
    /// The backend reported the job failed before any observation
    Failed {
        job_id: Option<JobId>,
        error: String,
    },
}

impl SubmissionOutcome {
    /// Classify a submission response body
    ///
    /// A non-empty `job_id` with a non-terminal status means "go observe".
    /// A `failed` status is a job failure, never a result. A body without
    /// a status is a synchronous answer and counts as completed; a
    /// non-terminal status without a `job_id` leaves nothing to observe
    /// and is rejected.
    pub fn from_response(body: serde_json::Value) -> Result<Self> {
        let mut result: ForecastResult = serde_json::from_value(body).map_err(|e| {
            DomainError::UnexpectedResponse(format!("malformed submission response: {}", e))
        })?;
        let job_id = result
            .job_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .map(str::to_string);

        match (result.status.clone(), job_id) {
            (JobStatus::Failed, job_id) => {
                let error = result
                    .error
                    .take()
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| FAILED_WITHOUT_MESSAGE.to_string());
                Ok(SubmissionOutcome::Failed { job_id, error })
            }
            (JobStatus::Completed, _) => Ok(SubmissionOutcome::Ready(Box::new(result))),
            (status, _) if status == JobStatus::default() => {
                result.status = JobStatus::Completed;
                Ok(SubmissionOutcome::Ready(Box::new(result)))
            }
            (_, Some(job_id)) => Ok(SubmissionOutcome::Accepted { job_id }),
            (status, None) => Err(DomainError::UnexpectedResponse(format!(
                "submission is still {} but carries no job_id",
                status
            ))),
        }
    }

    pub fn job_id(&self) -> Option<&str> {
        match self {
            SubmissionOutcome::Accepted { job_id } => Some(job_id),
            SubmissionOutcome::Ready(result) => result.job_id.as_deref(),
            SubmissionOutcome::Failed { job_id, .. } => job_id.as_deref(),
        }
    }
}

/// Body of `POST /datasets/upload`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRequest {
    pub filename: String,
    pub content_type: String,
}

/// Presigned object-storage target returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadTicket {
    pub url: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    pub dataset_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dataset_file_infers_content_type() {
        let file = DatasetFile::new("sales.CSV", b"date,sku\n".to_vec()).unwrap();
        assert_eq!(file.content_type, "text/csv");

        let file = DatasetFile::new("q1.xlsx", vec![1, 2, 3]).unwrap();
        assert!(file.content_type.contains("spreadsheetml"));
    }

    #[test]
    fn test_dataset_file_rejects_bad_input() {
        let err = DatasetFile::new("notes.txt", b"x".to_vec()).unwrap_err();
        assert!(err.to_string().contains("unsupported file type"));

        let err = DatasetFile::new("empty.csv", Vec::new()).unwrap_err();
        assert!(err.to_string().contains("empty"));

        assert!(DatasetFile::new("csv", b"x".to_vec()).is_err());
    }

    #[test]
    fn test_outcome_with_job_id_is_accepted() {
        let outcome = SubmissionOutcome::from_response(json!({"job_id": "job-42"})).unwrap();
        assert_eq!(
            outcome,
            SubmissionOutcome::Accepted {
                job_id: "job-42".to_string()
            }
        );
    }

    #[test]
    fn test_outcome_without_job_id_is_ready() {
        let outcome = SubmissionOutcome::from_response(json!({
            "summary": {"total_rows": 3},
            "forecasts": [],
            "insights": [],
            "methodology_notes": []
        }))
        .unwrap();
        match outcome {
            SubmissionOutcome::Ready(result) => {
                assert_eq!(result.status, JobStatus::Completed);
                assert_eq!(result.summary.total_rows, 3);
            }
            other => panic!("expected ready result, got {:?}", other),
        }
    }

    #[test]
    fn test_completed_result_with_job_id_is_ready() {
        let outcome = SubmissionOutcome::from_response(json!({
            "job_id": "job-7",
            "status": "completed",
            "forecasts": []
        }))
        .unwrap();
        assert!(matches!(outcome, SubmissionOutcome::Ready(_)));
        assert_eq!(outcome.job_id(), Some("job-7"));
    }

    #[test]
    fn test_failed_status_is_failure_not_result() {
        let outcome = SubmissionOutcome::from_response(json!({
            "job_id": "job-9",
            "status": "failed",
            "error": "dataset has no date column"
        }))
        .unwrap();
        assert_eq!(
            outcome,
            SubmissionOutcome::Failed {
                job_id: Some("job-9".to_string()),
                error: "dataset has no date column".to_string()
            }
        );
    }

    #[test]
    fn test_failed_without_message_gets_fallback() {
        let outcome =
            SubmissionOutcome::from_response(json!({"status": "failed", "error": "  "})).unwrap();
        match outcome {
            SubmissionOutcome::Failed { job_id, error } => {
                assert_eq!(job_id, None);
                assert_eq!(error, FAILED_WITHOUT_MESSAGE);
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_non_terminal_without_job_id_is_rejected() {
        for status in ["queued", "running", "pending"] {
            let err = SubmissionOutcome::from_response(json!({ "status": status })).unwrap_err();
            assert!(matches!(err, DomainError::UnexpectedResponse(_)));
            assert!(err.to_string().contains("no job_id"));
        }
    }

    #[test]
    fn test_unknown_status_with_job_id_is_accepted() {
        let outcome =
            SubmissionOutcome::from_response(json!({"job_id": "job-5", "status": "queued"}))
                .unwrap();
        assert_eq!(outcome.job_id(), Some("job-5"));
        assert!(matches!(outcome, SubmissionOutcome::Accepted { .. }));
    }

    #[test]
    fn test_malformed_body_is_unexpected_response() {
        let err = SubmissionOutcome::from_response(json!({"forecasts": "nope"})).unwrap_err();
        assert!(err.to_string().contains("malformed submission response"));
    }

    #[test]
    fn test_sample_request_body() {
        let body = serde_json::to_value(DatasetForecastRequest::sample(Some("retail".into()))).unwrap();
        assert_eq!(
            body,
            json!({"dataset_id": "sample-dataset-id", "parameters": {"industry": "retail"}})
        );
    }
}
