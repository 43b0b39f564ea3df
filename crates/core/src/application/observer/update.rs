// Observation updates and outcomes

use crate::domain::{
    CompleteData, ForecastResult, JobStatus, ObservationError, ObserverState, ProgressData,
    UpdateData,
};

/// How a job completed, depending on the transport that saw it
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Poll strategy: the full result payload
    Result(Box<ForecastResult>),
    /// Push strategy: the `complete` message
    Stream(CompleteData),
}

impl Completion {
    pub fn result(&self) -> Option<&ForecastResult> {
        match self {
            Completion::Result(result) => Some(result),
            Completion::Stream(_) => None,
        }
    }
}

/// One item of an observation stream
#[derive(Debug, Clone, PartialEq)]
pub enum JobUpdate {
    /// Non-terminal poll response
    Status {
        status: JobStatus,
        state: ObserverState,
    },
    Progress(ProgressData),
    Update(UpdateData),
    Completed(Completion),
    /// Job-reported failure: a normal terminal outcome
    Failed { error: String },
    /// Observation stopped without a terminal job state
    Aborted(ObservationError),
}

impl JobUpdate {
    /// No further updates follow this one
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            JobUpdate::Completed(_) | JobUpdate::Failed { .. } | JobUpdate::Aborted(_)
        )
    }
}

/// Terminal state reached by an observed job
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed(Completion),
    Failed(String),
}

impl JobOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, JobOutcome::Completed(_))
    }
}
