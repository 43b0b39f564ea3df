// HTTP adapter configuration

use std::time::Duration;

/// Backend used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Base URL of the forecasting API
    pub base_url: String,
    /// Base URL for the event stream, when served from another host
    pub stream_url: Option<String>,
    /// Total time budget for a non-streaming request
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            stream_url: None,
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl HttpBackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_stream_url(mut self, stream_url: impl Into<String>) -> Self {
        self.stream_url = Some(stream_url.into());
        self
    }

    pub fn with_timeouts(mut self, request: Duration, connect: Duration) -> Self {
        self.request_timeout = request;
        self.connect_timeout = connect;
        self
    }

    /// Base URL for `/forecasts/{job_id}/stream`
    pub fn stream_base(&self) -> &str {
        self.stream_url.as_deref().unwrap_or(&self.base_url)
    }
}
