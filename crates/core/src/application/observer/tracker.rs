// Job tracker - observer state plus the locally overlaid job

use crate::domain::{DomainError, ForecastJob, ForecastResult, JobId, JobStatus, ObserverState};
use crate::port::TimeProvider;
use std::sync::Arc;

/// Tracks one job from `idle` to a terminal state
///
/// Owned by a single observation task; nothing else mutates it.
pub struct JobTracker {
    job_id: JobId,
    state: ObserverState,
    job: ForecastJob,
    clock: Arc<dyn TimeProvider>,
}

impl JobTracker {
    pub fn new(job_id: impl Into<JobId>, clock: Arc<dyn TimeProvider>) -> Self {
        let job_id = job_id.into();
        let job = ForecastJob::submitted(job_id.clone(), clock.now());
        Self {
            job_id,
            state: ObserverState::Idle,
            job,
            clock,
        }
    }

    pub fn state(&self) -> ObserverState {
        self.state
    }

    pub fn job(&self) -> &ForecastJob {
        &self.job
    }

    /// Apply a status-only observation (push messages)
    pub fn record_status(&mut self, status: &JobStatus) -> Result<ObserverState, DomainError> {
        self.state = self.state.advance(&self.job_id, status)?;
        Ok(self.state)
    }

    /// Apply a full status payload (poll responses)
    pub fn record_snapshot(
        &mut self,
        snapshot: ForecastResult,
    ) -> Result<ObserverState, DomainError> {
        let next = self.state.advance(&self.job_id, &snapshot.status)?;
        if next == ObserverState::Completed {
            snapshot.validate()?;
        }
        self.job.overlay(snapshot, self.clock.now())?;
        self.state = next;
        Ok(next)
    }
}
