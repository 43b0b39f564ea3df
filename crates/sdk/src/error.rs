//! SDK Error Types

use imhotep_core::domain::{DomainError, ObservationError};
use imhotep_core::AppError;
use thiserror::Error;

/// SDK Result type
pub type Result<T> = std::result::Result<T, SdkError>;

/// SDK Error
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Observation aborted: {0}")]
    Observation(ObservationError),

    #[error("Unexpected backend response: {0}")]
    UnexpectedResponse(String),

    #[error("Forecast job {job_id} failed: {message}")]
    JobFailed { job_id: String, message: String },

    #[error("Observation of job {0} was cancelled")]
    Cancelled(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl SdkError {
    /// HTTP status of an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            SdkError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<AppError> for SdkError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::Api { status, message } => SdkError::Api { status, message },
            AppError::Transport(msg) => SdkError::Transport(msg),
            AppError::Validation(msg) => SdkError::Validation(msg),
            AppError::Domain(DomainError::ValidationError(msg)) => SdkError::Validation(msg),
            AppError::Domain(DomainError::UnexpectedResponse(msg)) => {
                SdkError::UnexpectedResponse(msg)
            }
            AppError::Observation(reason) => SdkError::Observation(reason),
            AppError::Cancelled(job_id) => SdkError::Cancelled(job_id),
            AppError::Config(msg) => SdkError::Config(msg),
            AppError::Io(e) => SdkError::Io(e),
            AppError::Serialization(e) => SdkError::Serialization(e),
            other => SdkError::Other(other.to_string()),
        }
    }
}

impl From<config::ConfigError> for SdkError {
    fn from(e: config::ConfigError) -> Self {
        SdkError::Config(e.to_string())
    }
}
