//! Configuration module for FlightScout.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::time::Duration;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the search backend (default: "http://localhost:8000")
    pub api_url: String,
    /// Delay between the end of one live-search poll and the next (default: 1500ms)
    pub poll_interval: Duration,
    /// Delay between calendar-month polls (default: 2000ms)
    pub calendar_poll_interval: Duration,
    /// Per-request timeout for backend calls (default: 30s)
    pub request_timeout: Duration,
    /// Path to the SQLite file holding favorites and the session (default: "flightscout.db")
    pub state_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            poll_interval: Duration::from_millis(1500),
            calendar_poll_interval: Duration::from_millis(2000),
            request_timeout: Duration::from_secs(30),
            state_path: "flightscout.db".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `FLIGHTSCOUT_API_URL`: backend base URL
    /// - `FLIGHTSCOUT_POLL_INTERVAL_MS`: live search poll interval
    /// - `FLIGHTSCOUT_CALENDAR_POLL_INTERVAL_MS`: calendar poll interval
    /// - `FLIGHTSCOUT_REQUEST_TIMEOUT_SECS`: request timeout
    /// - `FLIGHTSCOUT_STATE_PATH`: local state database path
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(url) = lookup("FLIGHTSCOUT_API_URL") {
            cfg.api_url = url.trim_end_matches('/').to_string();
        }

        if let Some(ms) = lookup("FLIGHTSCOUT_POLL_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            cfg.poll_interval = Duration::from_millis(ms);
        }

        if let Some(ms) = lookup("FLIGHTSCOUT_CALENDAR_POLL_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            cfg.calendar_poll_interval = Duration::from_millis(ms);
        }

        if let Some(secs) = lookup("FLIGHTSCOUT_REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            cfg.request_timeout = Duration::from_secs(secs);
        }

        if let Some(path) = lookup("FLIGHTSCOUT_STATE_PATH") {
            cfg.state_path = path;
        }

        cfg
    }
}
