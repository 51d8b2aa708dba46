use std::time::Duration;

use crate::board::JobId;

/// Connection settings for the job board REST backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend, e.g. "http://127.0.0.1:5000".
    /// A trailing slash is tolerated.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Collection endpoint, used for listing and creating jobs.
    pub fn jobs_url(&self) -> String {
        format!("{}/jobs", self.base_url.trim_end_matches('/'))
    }

    /// Item endpoint, used for updating and deleting a single job.
    pub fn job_url(&self, id: &JobId) -> String {
        format!("{}/{}", self.jobs_url(), id)
    }
}

/// Settings for the periodic refresh loop of `job watch`.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { interval_ms: 5_000 }
    }
}

impl WatchConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}
