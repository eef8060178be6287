//! Job lifecycle controller.
//!
//! `queued -> running -> {completed | failed | cancelled}`. Local state only
//! changes from poll responses; a stop request is advisory until the backend
//! reports a terminal status.

use serde::de::DeserializeOwned;
use std::sync::Arc;

use super::JobError;
use crate::api::SearchBackend;
use crate::model::{
    CalendarDay, CalendarRequest, Deal, JobStatus, SearchConfig, SearchJob, StatusResponse,
    SubmitResponse,
};

/// Result of a single poll attempt.
#[derive(Debug)]
pub enum PollOutcome<T> {
    /// No job, or the job already terminated; nothing was sent.
    Idle,
    /// The status call failed; state is unchanged and the next poll retries.
    Skipped,
    /// A response was received and applied.
    Updated(StatusResponse<T>),
}

/// Drives one job from submission to a terminal state.
pub struct JobController<B, T = Deal> {
    backend: Arc<B>,
    job: Option<SearchJob<T>>,
    stop_requested: bool,
    polls: u64,
}

impl<B, T> JobController<B, T>
where
    B: SearchBackend,
    T: DeserializeOwned + Clone + Send + 'static,
{
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            job: None,
            stop_requested: false,
            polls: 0,
        }
    }

    /// Current snapshot, if a job was submitted.
    pub fn job(&self) -> Option<&SearchJob<T>> {
        self.job.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.job.as_ref().map_or(false, |j| j.status.is_terminal())
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Number of status requests issued for the current job.
    pub fn polls(&self) -> u64 {
        self.polls
    }

    fn begin(&mut self, submitted: SubmitResponse) -> String {
        tracing::info!("Job {} queued: {}", submitted.job_id, submitted.message);
        let id = submitted.job_id.clone();
        self.job = Some(SearchJob::queued(submitted.job_id, submitted.message));
        self.stop_requested = false;
        self.polls = 0;
        id
    }

    /// Fetch the current status and apply it.
    ///
    /// A failed request is logged and leaves state untouched. Terminated jobs
    /// are never polled again.
    pub async fn poll(&mut self) -> PollOutcome<T> {
        let id = match &self.job {
            Some(job) if !job.status.is_terminal() => job.id.clone(),
            _ => return PollOutcome::Idle,
        };

        self.polls += 1;
        match self.backend.status::<T>(&id).await {
            Ok(response) => {
                self.apply(&response);
                PollOutcome::Updated(response)
            }
            Err(e) => {
                tracing::warn!("Status poll for job {} failed, retrying next interval: {}", id, e);
                PollOutcome::Skipped
            }
        }
    }

    /// Fold one status response into the job snapshot.
    pub fn apply(&mut self, response: &StatusResponse<T>) {
        let stop_requested = self.stop_requested;
        let Some(job) = self.job.as_mut() else {
            return;
        };
        if job.status.is_terminal() {
            tracing::debug!("Ignoring status for finished job {}", job.id);
            return;
        }
        if let Some(other) = response.job_id.as_deref() {
            if other != job.id {
                tracing::warn!("Ignoring status for job {} while tracking {}", other, job.id);
                return;
            }
        }

        job.progress = response.progress.min(100) as u8;
        job.message = response.message.clone();
        job.destinations_found = job.destinations_found.max(response.destinations_found);
        job.deals_found = job.deals_found.max(response.deals_found);

        match response.status {
            // Status never moves backwards
            JobStatus::Queued => {}
            JobStatus::Running => {
                if job.status == JobStatus::Queued {
                    tracing::info!("Job {} running", job.id);
                }
                job.status = JobStatus::Running;
                merge_partial(job, response);
            }
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled => {
                on_terminal(job, response, stop_requested);
            }
        }
    }

    /// Ask the backend to cancel. Local state waits for the next poll.
    pub async fn stop(&mut self) -> Result<(), JobError> {
        let job = self.job.as_ref().ok_or(JobError::NoActiveJob)?;
        if job.status.is_terminal() {
            return Ok(());
        }
        self.backend.stop(&job.id).await?;
        tracing::info!("Stop requested for job {}", job.id);
        self.stop_requested = true;
        Ok(())
    }
}

impl<B: SearchBackend> JobController<B, Deal> {
    /// Validate and submit a live search; arms polling on success.
    pub async fn submit(&mut self, config: &SearchConfig) -> Result<String, JobError> {
        config.validate()?;
        let submitted = self.backend.submit_search(&config.to_request()).await?;
        Ok(self.begin(submitted))
    }
}

impl<B: SearchBackend> JobController<B, CalendarDay> {
    /// Validate and submit a calendar-month search.
    pub async fn submit_calendar(&mut self, request: &CalendarRequest) -> Result<String, JobError> {
        request.validate()?;
        let submitted = self.backend.submit_calendar(request).await?;
        Ok(self.begin(submitted))
    }
}

/// Replace the working result set with the backend's current one.
fn merge_partial<T: Clone>(job: &mut SearchJob<T>, response: &StatusResponse<T>) {
    if let Some(partial) = &response.partial_results {
        job.partial_results = partial.clone();
    }
}

/// Commit the definitive results and freeze the job.
fn on_terminal<T: Clone>(job: &mut SearchJob<T>, response: &StatusResponse<T>, stop_requested: bool) {
    job.results = match (&response.results, response.status) {
        (Some(results), _) => results.clone(),
        // Cancelled without a result list keeps what had been merged
        (None, JobStatus::Cancelled) => std::mem::take(&mut job.partial_results),
        (None, _) => Vec::new(),
    };
    job.partial_results.clear();
    job.status = response.status;

    match response.status {
        JobStatus::Failed => {
            tracing::warn!("Job {} failed: {}", job.id, response.message);
        }
        JobStatus::Cancelled if !stop_requested => {
            tracing::warn!("Job {} cancelled without a local stop request", job.id);
        }
        status => {
            tracing::info!("Job {} {} with {} result(s)", job.id, status, job.results.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::job::testing::{deals_json, ScriptedBackend};
    use crate::model::{ValidationError, YearMonth};
    use serde_json::json;

    fn prices(deals: &[Deal]) -> Vec<f64> {
        deals.iter().map(|d| d.price).collect()
    }

    async fn submitted(backend: ScriptedBackend) -> (Arc<ScriptedBackend>, JobController<ScriptedBackend>) {
        let backend = Arc::new(backend);
        let mut controller = JobController::new(backend.clone());
        let id = controller.submit(&SearchConfig::default()).await.unwrap();
        assert_eq!(id, "job1");
        (backend, controller)
    }

    #[tokio::test]
    async fn test_invalid_config_never_sent() {
        let backend = Arc::new(ScriptedBackend::new("job1"));
        let mut controller: JobController<_> = JobController::new(backend.clone());

        let cfg = SearchConfig { durations: vec![], ..Default::default() };
        let err = controller.submit(&cfg).await.unwrap_err();
        assert!(matches!(err, JobError::Validation(ValidationError::NoDurations)));
        assert_eq!(backend.submit_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert!(controller.job().is_none());
    }

    #[tokio::test]
    async fn test_submit_connectivity_error_is_surfaced() {
        let backend = Arc::new(ScriptedBackend::failing_submit(ApiError::Connectivity(
            "connection refused".into(),
        )));
        let mut controller: JobController<_> = JobController::new(backend);

        let err = controller.submit(&SearchConfig::default()).await.unwrap_err();
        assert!(matches!(err, JobError::Connectivity(ApiError::Connectivity(_))));
        assert!(controller.job().is_none());
        assert!(matches!(controller.poll().await, PollOutcome::Idle));
    }

    #[tokio::test]
    async fn test_queued_then_running_replaces_partials() {
        let backend = ScriptedBackend::new("job1")
            .then(json!({"status": "pending", "progress": 0, "message": "Warte..."}))
            .then(json!({
                "status": "running", "progress": 20, "message": "Suche Flüge ab Wien...",
                "partial_results": deals_json(&[("Rom", 45.0), ("Athen", 61.0)])
            }))
            .then(json!({
                "status": "running", "progress": 40, "message": "Suche Flüge ab Wien...",
                "partial_results": deals_json(&[("Rom", 42.0)])
            }))
            .then(json!({"status": "running", "progress": 50, "message": "..."}));
        let (_, mut controller) = submitted(backend).await;
        assert_eq!(controller.job().unwrap().status, JobStatus::Queued);

        controller.poll().await;
        assert_eq!(controller.job().unwrap().status, JobStatus::Queued);
        assert_eq!(controller.job().unwrap().message, "Warte...");

        controller.poll().await;
        let job = controller.job().unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(prices(&job.partial_results), vec![45.0, 61.0]);

        controller.poll().await;
        // Replaced, not appended
        assert_eq!(prices(&controller.job().unwrap().partial_results), vec![42.0]);

        // A running reply without partials keeps the previous set
        controller.poll().await;
        let job = controller.job().unwrap();
        assert_eq!(job.progress, 50);
        assert_eq!(prices(job.current_results()), vec![42.0]);
    }

    #[tokio::test]
    async fn test_failed_poll_keeps_state_and_retries() {
        let backend = ScriptedBackend::new("job1")
            .then(json!({"status": "running", "progress": 10}))
            .then_err(ApiError::Connectivity("timeout".into()))
            .then_err(ApiError::Status { status: 502, message: "Bad Gateway".into() })
            .then(json!({"status": "running", "progress": 30}));
        let (backend, mut controller) = submitted(backend).await;

        assert!(matches!(controller.poll().await, PollOutcome::Updated(_)));
        assert!(matches!(controller.poll().await, PollOutcome::Skipped));
        assert!(matches!(controller.poll().await, PollOutcome::Skipped));
        assert_eq!(controller.job().unwrap().status, JobStatus::Running);
        assert_eq!(controller.job().unwrap().progress, 10);

        assert!(matches!(controller.poll().await, PollOutcome::Updated(_)));
        assert_eq!(controller.job().unwrap().progress, 30);
        assert_eq!(backend.status_calls(), 4);
    }

    #[tokio::test]
    async fn test_completed_commits_results_and_stops_polling() {
        let backend = ScriptedBackend::new("job1")
            .then(json!({
                "status": "running",
                "partial_results": deals_json(&[("Athen", 30.0)]),
                "destinations_found": 3, "deals_found": 5
            }))
            .then(json!({
                "status": "completed", "progress": 100, "message": "Fertig! 2 Deals gefunden.",
                "results": deals_json(&[("Rom", 42.0), ("Rom", 45.0)]),
                "destinations_found": 1, "deals_found": 2
            }))
            .then(json!({"status": "running"}));
        let (backend, mut controller) = submitted(backend).await;

        controller.poll().await;
        controller.poll().await;
        let job = controller.job().unwrap().clone();
        assert_eq!(job.status, JobStatus::Completed);
        // Exactly the terminal list, no union with earlier partials
        assert_eq!(prices(&job.results), vec![42.0, 45.0]);
        assert!(job.partial_results.is_empty());
        // Counters never decrease
        assert_eq!(job.destinations_found, 3);
        assert_eq!(job.deals_found, 5);

        assert!(matches!(controller.poll().await, PollOutcome::Idle));
        assert!(matches!(controller.poll().await, PollOutcome::Idle));
        assert_eq!(backend.status_calls(), 2);
        assert!(controller.is_finished());
    }

    #[tokio::test]
    async fn test_failed_message_verbatim() {
        let backend = ScriptedBackend::new("job1")
            .then(json!({"status": "failed", "progress": 0, "message": "Fehler: Rate limit"}));
        let (_, mut controller) = submitted(backend).await;

        controller.poll().await;
        let job = controller.job().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.message, "Fehler: Rate limit");
        assert!(job.results.is_empty());
    }

    #[tokio::test]
    async fn test_stop_is_advisory_and_cancel_keeps_partials() {
        let backend = ScriptedBackend::new("job1")
            .then(json!({
                "status": "running",
                "partial_results": deals_json(&[("Rom", 45.0), ("Paris", 52.0)])
            }))
            .then(json!({"status": "running", "message": "Wird abgebrochen..."}))
            .then(json!({"status": "cancelled", "message": "Abgebrochen"}));
        let (backend, mut controller) = submitted(backend).await;

        controller.poll().await;
        tokio_test::assert_ok!(controller.stop().await);
        assert_eq!(backend.stop_calls(), 1);
        assert!(controller.stop_requested());
        assert_eq!(controller.job().unwrap().status, JobStatus::Running);

        controller.poll().await;
        assert_eq!(controller.job().unwrap().status, JobStatus::Running);

        controller.poll().await;
        let job = controller.job().unwrap();
        assert_eq!(job.status, JobStatus::Cancelled);
        assert_eq!(prices(&job.results), vec![45.0, 52.0]);

        // Stopping a finished job sends nothing
        controller.stop().await.unwrap();
        assert_eq!(backend.stop_calls(), 1);
    }

    #[tokio::test]
    async fn test_stop_race_with_completion() {
        let backend = ScriptedBackend::new("job1").then(json!({
            "status": "completed",
            "results": deals_json(&[("Rom", 42.0)])
        }));
        let (_, mut controller) = submitted(backend).await;

        controller.stop().await.unwrap();
        controller.poll().await;
        let job = controller.job().unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(prices(&job.results), vec![42.0]);
    }

    #[tokio::test]
    async fn test_foreign_job_status_ignored() {
        let backend = ScriptedBackend::new("job1")
            .then(json!({"job_id": "other", "status": "completed", "results": []}));
        let (_, mut controller) = submitted(backend).await;

        controller.poll().await;
        assert_eq!(controller.job().unwrap().status, JobStatus::Queued);
    }

    #[tokio::test]
    async fn test_stop_without_job() {
        let backend = Arc::new(ScriptedBackend::new("job1"));
        let mut controller: JobController<_> = JobController::new(backend);
        assert!(matches!(controller.stop().await, Err(JobError::NoActiveJob)));
    }

    #[tokio::test]
    async fn test_calendar_job_results() {
        let backend = Arc::new(ScriptedBackend::new("cal1").then(json!({
            "status": "completed",
            "results": [
                {"date": "2026-03-20", "min_price": 55.0, "deals_count": 3},
                {"date": "2026-03-21", "min_price": null}
            ]
        })));
        let mut controller: JobController<_, CalendarDay> = JobController::new(backend);
        let request = CalendarRequest {
            airports: vec!["vie".into()],
            month: YearMonth::new(2026, 3).unwrap(),
            duration: 2,
            adults: 1,
            max_price: 70.0,
            blacklist_countries: vec![],
        };
        assert_eq!(controller.submit_calendar(&request).await.unwrap(), "cal1");

        controller.poll().await;
        let job = controller.job().unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.results.len(), 2);
        assert_eq!(job.results[0].min_price, Some(55.0));
        assert_eq!(controller.polls(), 1);
    }
}
