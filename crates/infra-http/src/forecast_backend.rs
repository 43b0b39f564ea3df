// HTTP ForecastBackend Implementation

use crate::client::ApiClient;
use async_trait::async_trait;
use imhotep_core::domain::{
    DatasetFile, DatasetForecastRequest, ForecastResult, ForecastSeries, SubmissionOutcome,
    UploadRequest, UploadTicket,
};
use imhotep_core::port::ForecastBackend;
use imhotep_core::{AppError, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, instrument};

/// Multipart part name expected by `POST /forecast`
const FILE_PART: &str = "file";

pub struct HttpForecastBackend {
    client: ApiClient,
}

impl HttpForecastBackend {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

pub(crate) fn file_part(file: &DatasetFile) -> Result<Part> {
    Part::bytes(file.bytes.clone())
        .file_name(file.filename.clone())
        .mime_str(&file.content_type)
        .map_err(|e| AppError::Validation(format!("invalid content type {}: {}", file.content_type, e)))
}

#[async_trait]
impl ForecastBackend for HttpForecastBackend {
    #[instrument(skip(self, file), fields(filename = %file.filename, bytes = file.len()))]
    async fn submit_file(&self, file: &DatasetFile) -> Result<SubmissionOutcome> {
        let form = Form::new().part(FILE_PART, file_part(file)?);
        let url = self.client.endpoint(&["forecast"])?;

        let body: Value = self
            .client
            .send_json(self.client.request(Method::POST, url).multipart(form))
            .await?;
        debug!("Forecast submission answered");

        Ok(SubmissionOutcome::from_response(body)?)
    }

    #[instrument(skip(self, request), fields(dataset_id = %request.dataset_id))]
    async fn submit_dataset(&self, request: &DatasetForecastRequest) -> Result<SubmissionOutcome> {
        let url = self.client.endpoint(&["forecasts"])?;

        let body: Value = self
            .client
            .send_json(self.client.request(Method::POST, url).json(request))
            .await?;

        Ok(SubmissionOutcome::from_response(body)?)
    }

    async fn fetch_status(&self, job_id: &str) -> Result<ForecastResult> {
        let url = self.client.endpoint(&["forecast", job_id])?;
        self.client
            .send_json(self.client.request(Method::GET, url))
            .await
    }

    async fn fetch_series(&self, job_id: &str) -> Result<ForecastSeries> {
        let url = self.client.endpoint(&["forecasts", job_id])?;
        self.client
            .send_json(self.client.request(Method::GET, url))
            .await
    }

    #[instrument(skip(self))]
    async fn request_upload(&self, filename: &str, content_type: &str) -> Result<UploadTicket> {
        let url = self.client.endpoint(&["datasets", "upload"])?;
        let request = UploadRequest {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
        };

        self.client
            .send_json(self.client.request(Method::POST, url).json(&request))
            .await
    }
}
