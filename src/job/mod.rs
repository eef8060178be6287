//! Job module for submitting searches and polling them to completion.

mod controller;
#[cfg(test)]
mod testing;

pub use controller::*;

use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::api::{ApiError, SearchBackend};
use crate::engine::{DealNotification, NotificationEngine};
use crate::model::{
    CalendarDay, CalendarRequest, Deal, JobStatus, SearchConfig, SearchJob, StatusResponse,
    ValidationError,
};

/// Buffered notifications before new ones are dropped.
const NOTIFICATION_BUFFER: usize = 64;

/// Job error types.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("invalid search: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Connectivity(#[from] ApiError),
    /// Backend message, verbatim.
    #[error("{0}")]
    Failed(String),
    #[error("no job submitted")]
    NoActiveJob,
    #[error("poll task aborted: {0}")]
    TaskAborted(String),
}

#[derive(Debug)]
enum JobCommand {
    Stop,
}

/// Handle to a job being polled in the background.
pub struct JobHandle<T = Deal> {
    /// Latest snapshot; updated after every applied poll.
    pub snapshots: watch::Receiver<SearchJob<T>>,
    /// New-destination notifications, in order of discovery.
    pub notifications: mpsc::Receiver<DealNotification>,
    commands: mpsc::Sender<JobCommand>,
    task: JoinHandle<SearchJob<T>>,
}

impl<T: Clone> JobHandle<T> {
    pub fn job_id(&self) -> String {
        self.snapshots.borrow().id.clone()
    }

    pub fn snapshot(&self) -> SearchJob<T> {
        self.snapshots.borrow().clone()
    }

    /// Request cancellation. Polling continues until the backend confirms.
    ///
    /// A stop request the backend does not accept is re-sent every interval
    /// until it goes through or the job terminates.
    pub async fn stop(&self) {
        if self.commands.send(JobCommand::Stop).await.is_err() {
            tracing::debug!("Stop ignored, poll task already finished");
        }
    }

    /// Wait for the terminal snapshot.
    ///
    /// A `failed` job yields [`JobError::Failed`] with the backend's message;
    /// `completed` and `cancelled` both return the final snapshot.
    pub async fn finished(self) -> Result<SearchJob<T>, JobError> {
        let JobHandle { commands, task, .. } = self;
        let job = task.await.map_err(|e| JobError::TaskAborted(e.to_string()))?;
        drop(commands);
        match job.status {
            JobStatus::Failed => Err(JobError::Failed(job.message)),
            _ => Ok(job),
        }
    }
}

/// Move a submitted controller onto a background task.
///
/// `on_running` sees every `running` response and returns the notifications
/// to forward.
pub fn spawn_job<B, T, F>(
    mut controller: JobController<B, T>,
    interval: Duration,
    mut on_running: F,
) -> Result<JobHandle<T>, JobError>
where
    B: SearchBackend + 'static,
    T: DeserializeOwned + Clone + Send + Sync + 'static,
    F: FnMut(&StatusResponse<T>) -> Vec<DealNotification> + Send + 'static,
{
    let initial = controller.job().cloned().ok_or(JobError::NoActiveJob)?;
    let (snapshot_tx, snapshot_rx) = watch::channel(initial);
    let (notify_tx, notify_rx) = mpsc::channel(NOTIFICATION_BUFFER);
    let (command_tx, command_rx) = mpsc::channel(4);

    let task = tokio::spawn(async move {
        run_poll_loop(
            &mut controller,
            interval,
            command_rx,
            &snapshot_tx,
            &notify_tx,
            &mut on_running,
        )
        .await;
        let last = snapshot_tx.borrow().clone();
        controller.job().cloned().unwrap_or(last)
    });

    Ok(JobHandle {
        snapshots: snapshot_rx,
        notifications: notify_rx,
        commands: command_tx,
        task,
    })
}

/// Poll until the job terminates or every handle is gone.
async fn run_poll_loop<B, T, F>(
    controller: &mut JobController<B, T>,
    interval: Duration,
    mut commands: mpsc::Receiver<JobCommand>,
    snapshots: &watch::Sender<SearchJob<T>>,
    notifications: &mpsc::Sender<DealNotification>,
    on_running: &mut F,
) where
    B: SearchBackend,
    T: DeserializeOwned + Clone + Send + Sync + 'static,
    F: FnMut(&StatusResponse<T>) -> Vec<DealNotification>,
{
    let mut stop_pending = false;

    while !controller.is_finished() {
        // Interval runs from the end of one poll to the start of the next
        let sleep = tokio::time::sleep(interval);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => break,
                cmd = commands.recv() => match cmd {
                    Some(JobCommand::Stop) => {
                        stop_pending = !request_stop(controller).await;
                    }
                    None => {
                        tracing::debug!("Job handle dropped, stopping poll loop");
                        return;
                    }
                },
            }
        }

        if stop_pending {
            stop_pending = !request_stop(controller).await;
        }

        let response = match controller.poll().await {
            PollOutcome::Updated(response) => response,
            PollOutcome::Skipped => continue,
            PollOutcome::Idle => break,
        };
        tracing::debug!(
            "Job poll: {} {}% ({} destinations, {} deals)",
            response.status,
            response.progress,
            response.destinations_found,
            response.deals_found
        );

        if response.status == JobStatus::Running {
            for n in on_running(&response) {
                if let Err(e) = notifications.try_send(n) {
                    tracing::warn!("Dropping notification: {}", e);
                }
            }
        }

        if let Some(job) = controller.job() {
            snapshots.send_replace(job.clone());
        }
    }
}

/// Send a stop request; `false` means it has to be retried.
async fn request_stop<B, T>(controller: &mut JobController<B, T>) -> bool
where
    B: SearchBackend,
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    match controller.stop().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Failed to request stop, retrying next interval: {}", e);
            false
        }
    }
}

/// Submit a live search and poll it in the background.
///
/// Each call starts with an empty set of announced destinations.
pub async fn start_search<B>(
    backend: Arc<B>,
    config: &SearchConfig,
    interval: Duration,
) -> Result<JobHandle<Deal>, JobError>
where
    B: SearchBackend + 'static,
{
    let mut controller = JobController::new(backend);
    controller.submit(config).await?;

    let mut seen = NotificationEngine::new();
    spawn_job(controller, interval, move |response: &StatusResponse<Deal>| {
        seen.observe(response.new_deals())
    })
}

/// Submit a calendar-month search and poll it in the background.
pub async fn start_calendar<B>(
    backend: Arc<B>,
    request: &CalendarRequest,
    interval: Duration,
) -> Result<JobHandle<CalendarDay>, JobError>
where
    B: SearchBackend + 'static,
{
    let mut controller = JobController::new(backend);
    controller.submit_calendar(request).await?;
    spawn_job(controller, interval, |_: &StatusResponse<CalendarDay>| Vec::new())
}
