use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::board::{Job, JobId, JobPayload};
use crate::config::ClientConfig;
use crate::error::{BoardError, Result};
use crate::store::JobStore;

/// `JobStore` backed by the job board REST API.
#[derive(Debug, Clone)]
pub struct HttpJobStore {
    client: Client,
    config: ClientConfig,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpJobStore {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| BoardError::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn decode<T: DeserializeOwned>(response: Response, id: Option<&JobId>) -> Result<T> {
        let response = Self::check(response, id).await?;
        Ok(response.json::<T>().await?)
    }

    /// Map non-success statuses onto the error taxonomy.
    async fn check(response: Response, id: Option<&JobId>) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);
        tracing::warn!(status = %status, error = %message, "Job board request failed");

        match (status, id) {
            (StatusCode::NOT_FOUND, Some(id)) => Err(BoardError::NotFound(id.clone())),
            (StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY, _) => {
                Err(BoardError::Validation(message))
            }
            _ => Err(BoardError::Transport(format!("{}: {}", status, message))),
        }
    }
}

#[async_trait]
impl JobStore for HttpJobStore {
    async fn list_jobs(&self) -> Result<Vec<Job>> {
        let url = self.config.jobs_url();
        tracing::debug!(url = %url, "Fetching jobs");
        let response = self.client.get(&url).send().await?;
        let jobs: Vec<Job> = Self::decode(response, None).await?;
        tracing::debug!(count = jobs.len(), "Fetched jobs");
        Ok(jobs)
    }

    async fn create_job(&self, payload: JobPayload) -> Result<Job> {
        let response = self
            .client
            .post(self.config.jobs_url())
            .json(&payload)
            .send()
            .await?;
        let job: Job = Self::decode(response, None).await?;
        tracing::info!(job_id = %job.id, title = %job.title, "Job created");
        Ok(job)
    }

    async fn update_job(&self, id: &JobId, payload: JobPayload) -> Result<Job> {
        let response = self
            .client
            .put(self.config.job_url(id))
            .json(&payload)
            .send()
            .await?;
        let job: Job = Self::decode(response, Some(id)).await?;
        tracing::info!(job_id = %job.id, "Job updated");
        Ok(job)
    }

    async fn delete_job(&self, id: &JobId) -> Result<()> {
        let response = self.client.delete(self.config.job_url(id)).send().await?;
        Self::check(response, Some(id)).await?;
        tracing::info!(job_id = %id, "Job deleted");
        Ok(())
    }
}
