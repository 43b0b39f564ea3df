// API client - shared request plumbing for the HTTP adapters

use crate::config::HttpBackendConfig;
use crate::error::{api_error, map_reqwest_error};
use imhotep_core::port::{IdProvider, SessionProvider};
use imhotep_core::{AppError, Result};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

pub(crate) const REQUEST_ID_HEADER: &str = "X-Request-ID";
pub(crate) const TENANT_HEADER: &str = "X-Tenant-ID";

/// Authenticated client for the forecasting API
///
/// Every request carries `X-Request-ID`, plus `Authorization: Bearer` and
/// `X-Tenant-ID` when the session has them. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    /// No total timeout: event streams stay open for the whole job
    stream_http: reqwest::Client,
    base_url: Url,
    stream_url: Url,
    session: Arc<dyn SessionProvider>,
    ids: Arc<dyn IdProvider>,
}

impl ApiClient {
    pub fn new(
        config: &HttpBackendConfig,
        session: Arc<dyn SessionProvider>,
        ids: Arc<dyn IdProvider>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {}", e)))?;
        let stream_http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            stream_http,
            base_url: parse_base(&config.base_url)?,
            stream_url: parse_base(config.stream_base())?,
            session,
            ids,
        })
    }

    /// Plain client for presigned uploads (no API credentials)
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// API URL for the given path segments; segments are percent-encoded
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        join(&self.base_url, segments)
    }

    pub fn stream_endpoint(&self, segments: &[&str]) -> Result<Url> {
        join(&self.stream_url, segments)
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.decorate(self.http.request(method, url))
    }

    pub(crate) fn stream_request(&self, url: Url) -> RequestBuilder {
        self.decorate(self.stream_http.get(url))
            .header(reqwest::header::ACCEPT, "text/event-stream")
    }

    fn decorate(&self, builder: RequestBuilder) -> RequestBuilder {
        let mut builder = builder.header(REQUEST_ID_HEADER, self.ids.generate_id());
        if let Some(token) = self.session.access_token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(tenant) = self.session.tenant_id() {
            builder = builder.header(TENANT_HEADER, tenant);
        }
        builder
    }

    /// Send and return the response if its status is a success
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(map_reqwest_error)?;
        ensure_success(response).await
    }

    /// Send and decode a JSON body
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        let body = response.text().await.map_err(map_reqwest_error)?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Turn a non-success response into `AppError::Api`
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), url = %url, "Backend returned an error status");
    Err(api_error(status, &body))
}

fn parse_base(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| AppError::Config(format!("invalid URL {}: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(AppError::Config(format!("invalid base URL {}", raw)));
    }
    Ok(url)
}

fn join(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| AppError::Config(format!("invalid base URL {}", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use imhotep_core::port::id_provider::SequentialIdProvider;
    use imhotep_core::port::StaticSession;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(
            &HttpBackendConfig::new(base),
            Arc::new(StaticSession::anonymous()),
            Arc::new(SequentialIdProvider::default()),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let c = client("http://localhost:8000");
        assert_eq!(
            c.endpoint(&["forecast", "job-1"]).unwrap().as_str(),
            "http://localhost:8000/forecast/job-1"
        );

        let c = client("https://api.example.com/v1/");
        assert_eq!(
            c.endpoint(&["forecasts", "a b"]).unwrap().as_str(),
            "https://api.example.com/v1/forecasts/a%20b"
        );
    }

    #[test]
    fn test_stream_url_defaults_to_api_url() {
        let c = client("http://localhost:8000");
        assert_eq!(
            c.stream_endpoint(&["forecasts", "j", "stream"]).unwrap().as_str(),
            "http://localhost:8000/forecasts/j/stream"
        );

        let config = HttpBackendConfig::new("http://api").with_stream_url("http://events:9000");
        let c = ApiClient::new(
            &config,
            Arc::new(StaticSession::anonymous()),
            Arc::new(SequentialIdProvider::default()),
        )
        .unwrap();
        assert_eq!(
            c.stream_endpoint(&["forecasts", "j", "stream"]).unwrap().as_str(),
            "http://events:9000/forecasts/j/stream"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let result = ApiClient::new(
            &HttpBackendConfig::new("not a url"),
            Arc::new(StaticSession::anonymous()),
            Arc::new(SequentialIdProvider::default()),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
