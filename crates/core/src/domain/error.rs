// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid job state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Job {job_id} is already terminal ({state}); no further transitions")]
    TerminalState { job_id: String, state: String },

    #[error("Job invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A backend response that fits no known shape
    #[error("Unexpected backend response: {0}")]
    UnexpectedResponse(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
