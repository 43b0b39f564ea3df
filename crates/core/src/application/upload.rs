// Upload Service - presigned upload followed by a dataset forecast

use super::submitter::{ForecastRequest, JobSubmitter};
use crate::domain::{DatasetFile, DatasetForecastRequest, SubmissionOutcome};
use crate::error::Result;
use crate::port::{ForecastBackend, ObjectStorage};
use std::sync::Arc;
use tracing::{debug, info};

/// Three-step upload handshake
///
/// 1. `POST /datasets/upload` for a presigned target
/// 2. upload the bytes straight to object storage
/// 3. `POST /forecasts` with the returned dataset id
///
/// Steps run in order; the first failure is returned as is.
pub struct UploadService {
    backend: Arc<dyn ForecastBackend>,
    storage: Arc<dyn ObjectStorage>,
    submitter: JobSubmitter,
}

impl UploadService {
    pub fn new(backend: Arc<dyn ForecastBackend>, storage: Arc<dyn ObjectStorage>) -> Self {
        let submitter = JobSubmitter::new(Arc::clone(&backend));
        Self {
            backend,
            storage,
            submitter,
        }
    }

    pub async fn upload_and_forecast(&self, file: DatasetFile) -> Result<SubmissionOutcome> {
        file.validate()?;

        let ticket = self
            .backend
            .request_upload(&file.filename, &file.content_type)
            .await?;
        debug!(filename = %file.filename, dataset_id = %ticket.dataset_id, "Upload ticket issued");

        self.storage.put(&ticket, &file).await?;
        info!(
            filename = %file.filename,
            dataset_id = %ticket.dataset_id,
            bytes = file.len(),
            "Dataset uploaded"
        );

        self.submitter
            .submit(ForecastRequest::Dataset(DatasetForecastRequest::new(
                ticket.dataset_id,
            )))
            .await
    }
}
