//! Job-status poller.
//!
//! DESIGN
//! ======
//! One background task per watched case. It fetches the latest job, publishes
//! the observation on a `watch` channel, and sleeps for the configured
//! interval only while the job is still running. The task belongs to its
//! [`JobPoller`]: dropping or cancelling the handle aborts it, so nothing
//! polls on behalf of a view that is gone.
//!
//! ERROR HANDLING
//! ==============
//! A 404 means the case never had a job and ends polling with
//! [`NO_JOB_MESSAGE`]. Any other failure is logged and also ends polling;
//! the caller decides whether to start a new poller.

#[cfg(test)]
#[path = "poll_test.rs"]
mod poll_test;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::types::Job;
use crate::api::{CaseId, ReviewApi};

pub const NO_JOB_MESSAGE: &str = "No analysis job found for this case.";

/// Latest observation of a case's processing job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// No response yet.
    Waiting,
    /// The job is queued or processing; another fetch is scheduled.
    Running(Job),
    /// The job reached `done` or `failed`.
    Finished(Job),
    /// The backend has no job for this case.
    NoJob,
    /// Polling stopped on an error; carries the user-facing message.
    Stopped(String),
}

impl PollEvent {
    /// Whether the poller has stopped after this event.
    #[must_use]
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Waiting | Self::Running(_))
    }
}

/// Handle owning a polling task.
pub struct JobPoller {
    events: watch::Receiver<PollEvent>,
    task: JoinHandle<()>,
}

/// Start polling `case_id` every `interval` until the job is terminal.
pub fn spawn_job_poller<A>(api: Arc<A>, case_id: CaseId, interval: Duration) -> JobPoller
where
    A: ReviewApi + ?Sized + 'static,
{
    let (tx, events) = watch::channel(PollEvent::Waiting);
    tracing::debug!(case_id, ?interval, "job poller started");
    let task = tokio::spawn(async move {
        loop {
            let event = match api.latest_job(case_id).await {
                Ok(job) if job.status.is_terminal() => PollEvent::Finished(job),
                Ok(job) => PollEvent::Running(job),
                Err(e) if e.is_not_found() => PollEvent::NoJob,
                Err(e) => {
                    tracing::error!(case_id, error = %e, "job status fetch failed");
                    PollEvent::Stopped(e.user_message())
                }
            };
            let stop = event.is_final();
            if tx.send(event).is_err() || stop {
                tracing::debug!(case_id, "job poller stopped");
                return;
            }
            tokio::time::sleep(interval).await;
        }
    });
    JobPoller { events, task }
}

impl JobPoller {
    /// The most recent observation.
    #[must_use]
    pub fn latest(&self) -> PollEvent {
        self.events.borrow().clone()
    }

    /// Wait for the next observation. `None` once the task has ended and
    /// every observation has been seen.
    pub async fn next(&mut self) -> Option<PollEvent> {
        self.events.changed().await.ok()?;
        Some(self.events.borrow_and_update().clone())
    }

    /// Wait until polling ends and return the final observation.
    pub async fn finished(&mut self) -> PollEvent {
        loop {
            let current = self.events.borrow_and_update().clone();
            if current.is_final() {
                return current;
            }
            if self.events.changed().await.is_err() {
                return self.events.borrow().clone();
            }
        }
    }

    /// Stop polling now.
    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Whether the polling task has exited.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for JobPoller {
    fn drop(&mut self) {
        self.task.abort();
    }
}
