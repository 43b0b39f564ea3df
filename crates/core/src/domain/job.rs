// Forecast Job Domain Model

use super::error::{DomainError, Result};
use super::result::ForecastResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Opaque job identifier assigned by the backend
pub type JobId = String;

/// Substituted when the backend marks a job failed but sends no message
pub const FAILED_WITHOUT_MESSAGE: &str = "forecast job failed without an error message";

/// Backend-reported job status
///
/// Unrecognised strings are kept as `Unknown` instead of failing to parse:
/// they are treated as "still working" and observed again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Unknown(String),
}

impl JobStatus {
    /// Map a wire status string to the local enumeration
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => JobStatus::Pending,
            "running" | "processing" => JobStatus::Running,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Unknown(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Unknown(raw) => raw,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, JobStatus::Unknown(_))
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        JobStatus::Unknown(String::new())
    }
}

impl From<String> for JobStatus {
    fn from(raw: String) -> Self {
        JobStatus::from_wire(&raw)
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Unknown(raw) if raw.is_empty() => write!(f, "<missing>"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Client-side observer state
///
/// `idle -> pending -> running -> {completed | failed}`.
/// `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObserverState {
    Idle,
    Pending,
    Running,
    Completed,
    Failed,
}

impl ObserverState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ObserverState::Completed | ObserverState::Failed)
    }

    /// Apply one observed status.
    ///
    /// The latest observation is current truth, so a `running -> pending`
    /// report is accepted. Unknown statuses keep the current non-terminal
    /// state (`idle` becomes `pending`).
    pub fn advance(self, job_id: &str, status: &JobStatus) -> Result<ObserverState> {
        if self.is_terminal() {
            return Err(DomainError::TerminalState {
                job_id: job_id.to_string(),
                state: self.to_string(),
            });
        }

        let next = match status {
            JobStatus::Pending => ObserverState::Pending,
            JobStatus::Running => ObserverState::Running,
            JobStatus::Completed => ObserverState::Completed,
            JobStatus::Failed => ObserverState::Failed,
            JobStatus::Unknown(_) => match self {
                ObserverState::Idle => ObserverState::Pending,
                current => current,
            },
        };
        Ok(next)
    }
}

impl std::fmt::Display for ObserverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObserverState::Idle => write!(f, "idle"),
            ObserverState::Pending => write!(f, "pending"),
            ObserverState::Running => write!(f, "running"),
            ObserverState::Completed => write!(f, "completed"),
            ObserverState::Failed => write!(f, "failed"),
        }
    }
}

/// Forecast Job Entity
///
/// Created at submission, mutated only by overlaying fresh backend reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastJob {
    pub id: JobId,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ForecastResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ForecastJob {
    /// A freshly accepted job (status `pending`)
    pub fn submitted(id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Pending,
            created_at: at,
            updated_at: at,
            result: None,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Check the status/result/error invariant
    pub fn validate(&self) -> Result<()> {
        match &self.status {
            JobStatus::Completed => {
                let result = self.result.as_ref().ok_or_else(|| {
                    DomainError::InvariantViolation(format!(
                        "completed job {} has no result",
                        self.id
                    ))
                })?;
                if result.status != JobStatus::Completed {
                    return Err(DomainError::InvariantViolation(format!(
                        "completed job {} carries a result with status {}",
                        self.id, result.status
                    )));
                }
                if self.error.is_some() {
                    return Err(DomainError::InvariantViolation(format!(
                        "completed job {} carries an error",
                        self.id
                    )));
                }
            }
            JobStatus::Failed => {
                if self.error.as_deref().map_or(true, |e| e.trim().is_empty()) {
                    return Err(DomainError::InvariantViolation(format!(
                        "failed job {} has no error message",
                        self.id
                    )));
                }
                if self.result.is_some() {
                    return Err(DomainError::InvariantViolation(format!(
                        "failed job {} carries a result",
                        self.id
                    )));
                }
            }
            _ => {
                if self.result.is_some() || self.error.is_some() {
                    return Err(DomainError::InvariantViolation(format!(
                        "non-terminal job {} carries a result or error",
                        self.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Overlay a freshly fetched status payload
    ///
    /// Rejected once the job is terminal. An unknown status keeps the
    /// current non-terminal status. `updated_at` never moves backwards.
    pub fn overlay(&mut self, snapshot: ForecastResult, observed_at: DateTime<Utc>) -> Result<()> {
        if self.is_terminal() {
            return Err(DomainError::TerminalState {
                job_id: self.id.clone(),
                state: self.status.to_string(),
            });
        }

        if observed_at < self.updated_at {
            warn!(
                job_id = %self.id,
                updated_at = %self.updated_at,
                observed_at = %observed_at,
                "Observation older than current state, keeping updated_at"
            );
        } else {
            self.updated_at = observed_at;
        }

        match snapshot.status.clone() {
            JobStatus::Completed => {
                self.status = JobStatus::Completed;
                self.error = None;
                self.result = Some(snapshot);
            }
            JobStatus::Failed => {
                let error = snapshot
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| FAILED_WITHOUT_MESSAGE.to_string());
                self.status = JobStatus::Failed;
                self.result = None;
                self.error = Some(error);
            }
            JobStatus::Unknown(_) => {}
            status => self.status = status,
        }

        self.validate()
    }
}
