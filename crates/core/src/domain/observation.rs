// Observation failure kinds

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an observation stopped before the job reached a terminal state
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObservationError {
    /// Poll request failure or push-channel error event
    #[error("transport error: {0}")]
    Transport(String),

    /// The push channel ended without a `complete` or `error` message
    #[error("push channel closed before a terminal message")]
    StreamEnded,

    /// The backend reported something the job model cannot accept
    #[error("invalid job payload: {0}")]
    Protocol(String),

    /// Poll cap reached while the job was still non-terminal
    #[error("job still not terminal after {attempts} polls")]
    PollLimitExceeded { attempts: u32 },
}
