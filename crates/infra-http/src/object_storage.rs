// Presigned ObjectStorage Implementation

use crate::client::{ensure_success, ApiClient};
use crate::error::map_reqwest_error;
use crate::forecast_backend::file_part;
use async_trait::async_trait;
use imhotep_core::domain::{DatasetFile, UploadTicket};
use imhotep_core::port::ObjectStorage;
use imhotep_core::{AppError, Result};
use reqwest::multipart::Form;
use reqwest::Url;
use tracing::{debug, instrument};

/// Uploads to a presigned POST target
///
/// Ticket fields go first and the file last, as S3-style policies require.
/// API credentials are never sent to storage.
pub struct PresignedObjectStorage {
    http: reqwest::Client,
}

impl PresignedObjectStorage {
    pub fn new(client: &ApiClient) -> Self {
        Self {
            http: client.http().clone(),
        }
    }
}

#[async_trait]
impl ObjectStorage for PresignedObjectStorage {
    #[instrument(skip(self, ticket, file), fields(dataset_id = %ticket.dataset_id, filename = %file.filename))]
    async fn put(&self, ticket: &UploadTicket, file: &DatasetFile) -> Result<()> {
        let url = Url::parse(&ticket.url)
            .map_err(|e| AppError::Validation(format!("invalid upload URL {}: {}", ticket.url, e)))?;

        let form = ticket
            .fields
            .iter()
            .fold(Form::new(), |form, (name, value)| {
                form.text(name.clone(), value.clone())
            })
            .part("file", file_part(file)?);

        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;

        debug!(status = response.status().as_u16(), "Object storage accepted upload");
        Ok(())
    }
}
