//! Scripted in-memory backend for job tests.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::api::{ApiError, SearchBackend};
use crate::model::{CalendarRequest, SearchRequest, StatusResponse, SubmitResponse};

/// Replays canned status replies in order.
pub(crate) struct ScriptedBackend {
    submit: Mutex<Option<Result<SubmitResponse, ApiError>>>,
    statuses: Mutex<VecDeque<Result<Value, ApiError>>>,
    stop_failures: Mutex<VecDeque<ApiError>>,
    pub submit_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub stop_calls: AtomicUsize,
    pub last_search: Mutex<Option<SearchRequest>>,
}

impl ScriptedBackend {
    pub fn new(job_id: &str) -> Self {
        Self {
            submit: Mutex::new(Some(Ok(SubmitResponse {
                job_id: job_id.to_string(),
                status: None,
                progress: 0,
                message: "Suche gestartet...".to_string(),
            }))),
            statuses: Mutex::new(VecDeque::new()),
            stop_failures: Mutex::new(VecDeque::new()),
            submit_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
            last_search: Mutex::new(None),
        }
    }

    pub fn failing_submit(err: ApiError) -> Self {
        let backend = Self::new("unused");
        *backend.submit.lock().unwrap() = Some(Err(err));
        backend
    }

    pub fn then(self, status: Value) -> Self {
        self.statuses.lock().unwrap().push_back(Ok(status));
        self
    }

    pub fn then_err(self, err: ApiError) -> Self {
        self.statuses.lock().unwrap().push_back(Err(err));
        self
    }

    /// Fail the next stop request with `err`; later ones succeed.
    pub fn then_stop_err(self, err: ApiError) -> Self {
        self.stop_failures.lock().unwrap().push_back(err);
        self
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    fn take_submit(&self) -> Result<SubmitResponse, ApiError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submit
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(ApiError::Connectivity("no submit scripted".into())))
    }
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
    async fn submit_search(&self, request: &SearchRequest) -> Result<SubmitResponse, ApiError> {
        *self.last_search.lock().unwrap() = Some(request.clone());
        self.take_submit()
    }

    async fn submit_calendar(&self, _request: &CalendarRequest) -> Result<SubmitResponse, ApiError> {
        self.take_submit()
    }

    async fn status<T>(&self, _job_id: &str) -> Result<StatusResponse<T>, ApiError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Connectivity("script exhausted".into())));
        let value = next?;
        serde_json::from_value(value).map_err(|e| ApiError::Connectivity(e.to_string()))
    }

    async fn stop(&self, _job_id: &str) -> Result<(), ApiError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        let failure = self.stop_failures.lock().unwrap().pop_front();
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// A status reply carrying deals built from `(city, price)` pairs.
pub(crate) fn deals_json(items: &[(&str, f64)]) -> Value {
    Value::Array(
        items
            .iter()
            .map(|(city, price)| {
                serde_json::json!({
                    "city": city,
                    "country": "Italien",
                    "price": price,
                    "origin": "Wien",
                    "departure_date": "2026-03-20",
                    "return_date": "2026-03-22"
                })
            })
            .collect(),
    )
}
