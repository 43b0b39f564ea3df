// Poll strategy - fetch status on a timer until terminal

use super::cancel::CancelToken;
use super::observation::{Observation, UpdateSink};
use super::policy::PollPolicy;
use super::tracker::JobTracker;
use super::update::{Completion, JobUpdate};
use crate::domain::{JobId, JobStatus, ObservationError, ObserverState, FAILED_WITHOUT_MESSAGE};
use crate::port::{ForecastBackend, TimeProvider};
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Observes a job by polling `GET /forecast/{job_id}`
#[derive(Clone)]
pub struct PollObserver {
    backend: Arc<dyn ForecastBackend>,
    clock: Arc<dyn TimeProvider>,
    policy: PollPolicy,
}

impl PollObserver {
    pub fn new(
        backend: Arc<dyn ForecastBackend>,
        clock: Arc<dyn TimeProvider>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            backend,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Start polling `job_id` on a background task
    pub fn observe(&self, job_id: impl Into<JobId>) -> Observation {
        let job_id = job_id.into();
        let observer = self.clone();
        let task_job_id = job_id.clone();
        Observation::spawn(job_id, move |sink, cancel| {
            observer.run(task_job_id, sink, cancel)
        })
    }

    async fn run(self, job_id: JobId, mut sink: UpdateSink, mut cancel: CancelToken) {
        let mut tracker = JobTracker::new(job_id.clone(), Arc::clone(&self.clock));
        let mut attempts: u32 = 0;

        info!(
            job_id = %job_id,
            interval_ms = %self.policy.interval.as_millis(),
            "Polling job status"
        );

        loop {
            if cancel.is_cancelled() {
                debug!(job_id = %job_id, attempts, "Observation cancelled before poll");
                return;
            }

            attempts += 1;
            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(job_id = %job_id, attempts, "Observation cancelled during poll");
                    return;
                }
                response = self.backend.fetch_status(&job_id) => response,
            };

            // A failed poll ends the observation; restarting is the caller's call
            let snapshot = match response {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!(job_id = %job_id, attempt = attempts, error = %e, "Status poll failed");
                    sink.emit(JobUpdate::Aborted(ObservationError::Transport(e.to_string())))
                        .await;
                    return;
                }
            };

            let status = snapshot.status.clone();
            if let JobStatus::Unknown(raw) = &status {
                warn!(job_id = %job_id, status = %raw, "Unrecognised job status, still observing");
            }

            let state = match tracker.record_snapshot(snapshot) {
                Ok(state) => state,
                Err(e) => {
                    warn!(job_id = %job_id, error = %e, "Rejected status payload");
                    sink.emit(JobUpdate::Aborted(ObservationError::Protocol(e.to_string())))
                        .await;
                    return;
                }
            };

            debug!(job_id = %job_id, attempt = attempts, status = %status, state = %state, "Job status observed");

            match state {
                ObserverState::Completed => {
                    let result = tracker.job().result.clone().unwrap_or_default();
                    info!(job_id = %job_id, attempts, "Job completed");
                    sink.emit(JobUpdate::Completed(Completion::Result(Box::new(result))))
                        .await;
                    return;
                }
                ObserverState::Failed => {
                    let error = tracker
                        .job()
                        .error
                        .clone()
                        .unwrap_or_else(|| FAILED_WITHOUT_MESSAGE.to_string());
                    info!(job_id = %job_id, attempts, error = %error, "Job failed");
                    sink.emit(JobUpdate::Failed { error }).await;
                    return;
                }
                _ => {
                    if !sink.emit(JobUpdate::Status { status, state }).await {
                        debug!(job_id = %job_id, "Consumer gone, stopping poll");
                        return;
                    }
                }
            }

            if !self.policy.allows_another(attempts) {
                warn!(job_id = %job_id, attempts, "Poll limit reached before terminal status");
                sink.emit(JobUpdate::Aborted(ObservationError::PollLimitExceeded {
                    attempts,
                }))
                .await;
                return;
            }

            let delay = self.policy.delay_for(attempts);
            debug!(job_id = %job_id, attempt = attempts, delay_ms = %delay.as_millis(), "Scheduling next poll");

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(job_id = %job_id, attempts, "Observation cancelled, pending poll dropped");
                    return;
                }
                _ = sleep(delay) => {}
            }
        }
    }
}
