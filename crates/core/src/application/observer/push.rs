// Push strategy - one server-push channel per job

use super::cancel::CancelToken;
use super::observation::{Observation, UpdateSink};
use super::tracker::JobTracker;
use super::update::{Completion, JobUpdate};
use crate::domain::{JobId, JobStatus, ObservationError, StreamEvent, FAILED_WITHOUT_MESSAGE};
use crate::port::{PushChannel, PushTransport, TimeProvider};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why the message pump stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PumpExit {
    Terminal,
    TransportError,
    StreamEnded,
    Cancelled,
}

/// Observes a job through `GET /forecasts/{job_id}/stream`
///
/// No reconnect: a transport error ends the observation.
#[derive(Clone)]
pub struct PushObserver {
    transport: Arc<dyn PushTransport>,
    clock: Arc<dyn TimeProvider>,
}

impl PushObserver {
    pub fn new(transport: Arc<dyn PushTransport>, clock: Arc<dyn TimeProvider>) -> Self {
        Self { transport, clock }
    }

    /// Open the push channel for `job_id` on a background task
    pub fn observe(&self, job_id: impl Into<JobId>) -> Observation {
        let job_id = job_id.into();
        let observer = self.clone();
        let task_job_id = job_id.clone();
        Observation::spawn(job_id, move |sink, cancel| {
            observer.run(task_job_id, sink, cancel)
        })
    }

    async fn run(self, job_id: JobId, mut sink: UpdateSink, mut cancel: CancelToken) {
        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(job_id = %job_id, "Observation cancelled before channel opened");
                return;
            }
            opened = self.transport.open(&job_id) => opened,
        };

        let mut channel = match opened {
            Ok(channel) => channel,
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "Failed to open push channel");
                sink.emit(JobUpdate::Aborted(ObservationError::Transport(e.to_string())))
                    .await;
                return;
            }
        };
        info!(job_id = %job_id, "Push channel open");

        let mut tracker = JobTracker::new(job_id.clone(), Arc::clone(&self.clock));
        let exit = pump(
            &job_id,
            &mut *channel,
            &mut tracker,
            &mut sink,
            &mut cancel,
        )
        .await;

        // Single exit point: the channel is closed exactly once
        channel.close();
        debug!(job_id = %job_id, exit = ?exit, state = %tracker.state(), "Push channel closed");
    }
}

async fn pump(
    job_id: &str,
    channel: &mut dyn PushChannel,
    tracker: &mut JobTracker,
    sink: &mut UpdateSink,
    cancel: &mut CancelToken,
) -> PumpExit {
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return PumpExit::Cancelled,
            next = channel.next_message() => next,
        };

        let raw = match next {
            Some(Ok(raw)) => raw,
            Some(Err(e)) => {
                warn!(job_id = %job_id, error = %e, "Push channel error");
                sink.emit(JobUpdate::Aborted(ObservationError::Transport(e.to_string())))
                    .await;
                return PumpExit::TransportError;
            }
            None => {
                warn!(job_id = %job_id, "Push channel ended before a terminal message");
                sink.emit(JobUpdate::Aborted(ObservationError::StreamEnded))
                    .await;
                return PumpExit::StreamEnded;
            }
        };

        // Malformed messages are skipped; only transport errors end the channel
        let event = match StreamEvent::parse(&raw) {
            Ok(event) => event,
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "Ignoring malformed push message");
                continue;
            }
        };

        let (status, update) = match event {
            StreamEvent::Progress(data) => (JobStatus::Running, JobUpdate::Progress(data)),
            StreamEvent::Update(data) => (JobStatus::Running, JobUpdate::Update(data)),
            StreamEvent::Complete(data) => (
                JobStatus::Completed,
                JobUpdate::Completed(Completion::Stream(data)),
            ),
            StreamEvent::Error(data) => {
                let error = if data.message.trim().is_empty() {
                    FAILED_WITHOUT_MESSAGE.to_string()
                } else {
                    data.message
                };
                (JobStatus::Failed, JobUpdate::Failed { error })
            }
        };

        if let Err(e) = tracker.record_status(&status) {
            warn!(job_id = %job_id, error = %e, "Message after terminal state ignored");
            return PumpExit::Terminal;
        }

        let terminal = update.is_final();
        if !sink.emit(update).await {
            return PumpExit::Cancelled;
        }
        if terminal {
            info!(job_id = %job_id, state = %tracker.state(), "Job reached terminal state");
            return PumpExit::Terminal;
        }
    }
}
