// Imhotep Infrastructure - HTTP Adapters
// Implements: ForecastBackend, ObjectStorage, PushTransport (server-sent events)

mod client;
mod config;
mod error;
mod forecast_backend;
mod object_storage;
mod push_transport;
pub mod sse;

pub use client::ApiClient;
pub use config::{HttpBackendConfig, DEFAULT_API_URL};
pub use forecast_backend::HttpForecastBackend;
pub use object_storage::PresignedObjectStorage;
pub use push_transport::{SseChannel, SseTransport};

// Note: reqwest::Error conversion is done by helper functions in `error`
// because of the orphan rule (no From<reqwest::Error> for AppError here)
