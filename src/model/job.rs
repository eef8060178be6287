//! Job status wire types and the client-side job snapshot.

use serde::{Deserialize, Serialize};

use super::Deal;

/// Lifecycle state of a backend search job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[serde(alias = "pending")]
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Terminal states permanently stop polling.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reply to `POST /search` and `POST /calendar`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub job_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub message: String,
}

/// Reply to `GET /status/{job_id}`.
///
/// `T` is the result item: [`Deal`] for live searches, a calendar day for
/// month searches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse<T = Deal> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    pub status: JobStatus,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub message: String,
    pub results: Option<Vec<T>>,
    pub partial_results: Option<Vec<T>>,
    #[serde(default)]
    pub new_deals: Option<Vec<Deal>>,
    #[serde(default)]
    pub destinations_found: u32,
    #[serde(default)]
    pub deals_found: u32,
}

impl<T> StatusResponse<T> {
    /// Deals the backend tagged as new since the previous poll.
    pub fn new_deals(&self) -> &[Deal] {
        self.new_deals.as_deref().unwrap_or_default()
    }
}

/// Client-side view of one job, updated only from poll responses.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchJob<T = Deal> {
    pub id: String,
    pub status: JobStatus,
    /// 0-100
    pub progress: u8,
    pub message: String,
    pub destinations_found: u32,
    pub deals_found: u32,
    /// Definitive results, committed once a terminal status is observed.
    pub results: Vec<T>,
    /// Backend's best-known results while running.
    pub partial_results: Vec<T>,
}

impl<T> SearchJob<T> {
    /// A freshly acknowledged job with no progress reported yet.
    pub fn queued(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Queued,
            progress: 0,
            message: message.into(),
            destinations_found: 0,
            deals_found: 0,
            results: Vec::new(),
            partial_results: Vec::new(),
        }
    }

    /// Results a caller should currently display.
    pub fn current_results(&self) -> &[T] {
        if self.status.is_terminal() {
            &self.results
        } else {
            &self.partial_results
        }
    }
}
