// Observation handle - the consumer side of a running observer task

use super::cancel::{cancel_channel, CancelHandle, CancelToken};
use super::constants::UPDATE_CHANNEL_CAPACITY;
use super::update::{JobOutcome, JobUpdate};
use crate::domain::JobId;
use crate::error::{AppError, Result};
use futures::Stream;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Sending side handed to the observer task
pub struct UpdateSink {
    tx: mpsc::Sender<JobUpdate>,
    cancel: CancelToken,
}

impl UpdateSink {
    /// Deliver an update. Returns false when the consumer is gone or the
    /// observation was cancelled, in which case the task must stop.
    pub async fn emit(&mut self, update: JobUpdate) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.tx.send(update) => sent.is_ok(),
        }
    }
}

/// A running observation of one job
///
/// Yields [`JobUpdate`]s until a final one. Dropping the observation is
/// teardown: the task is cancelled, no further request is issued and any
/// push channel is closed.
pub struct Observation {
    job_id: JobId,
    updates: mpsc::Receiver<JobUpdate>,
    cancel: CancelHandle,
    task: Option<JoinHandle<()>>,
}

impl Observation {
    /// Spawn an observer task on the current tokio runtime
    pub(crate) fn spawn<F, Fut>(job_id: JobId, run: F) -> Self
    where
        F: FnOnce(UpdateSink, CancelToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, updates) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
        let (cancel, token) = cancel_channel();
        let sink = UpdateSink {
            tx,
            cancel: token.clone(),
        };
        let task = tokio::spawn(run(sink, token));
        Self {
            job_id,
            updates,
            cancel,
            task: Some(task),
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Next update, or `None` once the observation has ended
    pub async fn next_update(&mut self) -> Option<JobUpdate> {
        self.updates.recv().await
    }

    /// Stop observing. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel and wait until the observer task has exited
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Drain updates until the job reaches a terminal state
    ///
    /// Job-reported failure is `Ok(JobOutcome::Failed)`; an aborted or
    /// cancelled observation is an error.
    pub async fn outcome(mut self) -> Result<JobOutcome> {
        while let Some(update) = self.updates.recv().await {
            match update {
                JobUpdate::Completed(completion) => return Ok(JobOutcome::Completed(completion)),
                JobUpdate::Failed { error } => return Ok(JobOutcome::Failed(error)),
                JobUpdate::Aborted(reason) => return Err(AppError::Observation(reason)),
                _ => {}
            }
        }
        Err(AppError::Cancelled(self.job_id.clone()))
    }
}

impl Stream for Observation {
    type Item = JobUpdate;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<JobUpdate>> {
        self.updates.poll_recv(cx)
    }
}

impl Drop for Observation {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observation")
            .field("job_id", &self.job_id)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
