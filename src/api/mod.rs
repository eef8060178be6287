//! Backend API module.
//!
//! The job controller only needs the four job calls, so they sit behind
//! [`SearchBackend`]; the HTTP implementation adds the account endpoints.

mod account;
mod client;

pub use client::*;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::model::{CalendarRequest, SearchRequest, StatusResponse, SubmitResponse};

/// Backend error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request could not be sent or the reply could not be parsed.
    #[error("connectivity error: {0}")]
    Connectivity(String),
    #[error("backend replied {status}: {message}")]
    Status { status: u16, message: String },
    #[error("not logged in")]
    Unauthorized,
}

/// Job endpoints of the search backend.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// `POST /search`
    async fn submit_search(&self, request: &SearchRequest) -> Result<SubmitResponse, ApiError>;

    /// `POST /calendar`
    async fn submit_calendar(&self, request: &CalendarRequest) -> Result<SubmitResponse, ApiError>;

    /// `GET /status/{job_id}`
    async fn status<T>(&self, job_id: &str) -> Result<StatusResponse<T>, ApiError>
    where
        T: DeserializeOwned + Send + 'static;

    /// `POST /stop/{job_id}`
    async fn stop(&self, job_id: &str) -> Result<(), ApiError>;
}
