//! HTTP implementation of the backend API.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use super::{ApiError, SearchBackend};
use crate::model::{CalendarRequest, SearchRequest, StatusResponse, SubmitResponse};

/// `reqwest`-backed client for the search backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Connectivity(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer token, or fail before anything is sent.
    pub(crate) fn authed(&self, builder: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        match &self.token {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Err(ApiError::Unauthorized),
        }
    }

    /// `GET /download/{job_id}`: the PDF report of a completed job.
    pub async fn download_report(&self, job_id: &str) -> Result<Vec<u8>, ApiError> {
        let response = send(self.client.get(self.url(&format!("/download/{}", job_id)))).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Connectivity(e.to_string()))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl SearchBackend for HttpBackend {
    async fn submit_search(&self, request: &SearchRequest) -> Result<SubmitResponse, ApiError> {
        send_json(self.client.post(self.url("/search")).json(request)).await
    }

    async fn submit_calendar(&self, request: &CalendarRequest) -> Result<SubmitResponse, ApiError> {
        send_json(self.client.post(self.url("/calendar")).json(request)).await
    }

    async fn status<T>(&self, job_id: &str) -> Result<StatusResponse<T>, ApiError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        send_json(self.client.get(self.url(&format!("/status/{}", job_id)))).await
    }

    async fn stop(&self, job_id: &str) -> Result<(), ApiError> {
        send(self.client.post(self.url(&format!("/stop/{}", job_id)))).await?;
        Ok(())
    }
}

/// Send a request and turn non-success replies into [`ApiError`].
pub(crate) async fn send(builder: RequestBuilder) -> Result<Response, ApiError> {
    let response = builder.send().await.map_err(|e| {
        if e.is_timeout() {
            ApiError::Connectivity(format!("request timed out: {}", e))
        } else {
            ApiError::Connectivity(e.to_string())
        }
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

pub(crate) async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
    let response = send(builder).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Connectivity(format!("invalid response body: {}", e)))
}

/// Extract the `detail` field error replies carry, falling back to the raw body.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        detail: serde_json::Value,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { detail: serde_json::Value::String(s) }) => s,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) => body.trim().to_string(),
    }
}
