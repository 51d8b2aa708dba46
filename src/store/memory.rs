use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::board::{Job, JobId, JobPayload};
use crate::error::{BoardError, Result};
use crate::store::JobStore;

#[derive(Debug, Default)]
struct MemoryState {
    jobs: Vec<Job>,
    next_id: u64,
}

/// Process-local `JobStore`. Behaves like the REST backend: numeric ids,
/// posting date stamped on create, newest first on list, and title/company
/// required.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    state: RwLock<MemoryState>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing jobs. New ids continue after the largest
    /// numeric id present.
    pub fn with_jobs(jobs: Vec<Job>) -> Self {
        let next_id = jobs
            .iter()
            .filter_map(|j| j.id.as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            state: RwLock::new(MemoryState { jobs, next_id }),
        }
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.jobs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.jobs.is_empty()
    }

    fn validate(payload: &JobPayload) -> Result<()> {
        if payload.title.is_empty() || payload.company.is_empty() {
            return Err(BoardError::Validation(
                "Title and company are required".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn list_jobs(&self) -> Result<Vec<Job>> {
        let mut jobs = self.state.read().await.jobs.clone();
        jobs.sort_by(|a, b| b.posting_date.cmp(&a.posting_date));
        Ok(jobs)
    }

    async fn create_job(&self, payload: JobPayload) -> Result<Job> {
        Self::validate(&payload)?;
        let mut state = self.state.write().await;
        state.next_id += 1;
        let job = Job::from_payload(JobId::from(state.next_id), payload, Utc::now());
        state.jobs.push(job.clone());
        tracing::debug!(job_id = %job.id, "Job created in memory store");
        Ok(job)
    }

    async fn update_job(&self, id: &JobId, payload: JobPayload) -> Result<Job> {
        Self::validate(&payload)?;
        let mut state = self.state.write().await;
        let job = state
            .jobs
            .iter_mut()
            .find(|j| &j.id == id)
            .ok_or_else(|| BoardError::NotFound(id.clone()))?;
        *job = Job::from_payload(id.clone(), payload, job.posting_date);
        Ok(job.clone())
    }

    async fn delete_job(&self, id: &JobId) -> Result<()> {
        let mut state = self.state.write().await;
        let before = state.jobs.len();
        state.jobs.retain(|j| &j.id != id);
        if state.jobs.len() == before {
            return Err(BoardError::NotFound(id.clone()));
        }
        Ok(())
    }
}
