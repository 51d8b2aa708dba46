pub mod http;
pub mod memory;

use async_trait::async_trait;

use crate::board::{Job, JobId, JobPayload};
use crate::error::Result;

pub use http::HttpJobStore;
pub use memory::MemoryJobStore;

/// Backend holding the authoritative job collection.
///
/// Implementations surface failures as `BoardError::Transport` (unreachable or
/// unexpected status), `BoardError::NotFound` (unknown id) or
/// `BoardError::Validation` (payload rejected). Nothing is retried.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn list_jobs(&self) -> Result<Vec<Job>>;

    /// The backend assigns `id` and `posting_date`.
    async fn create_job(&self, payload: JobPayload) -> Result<Job>;

    async fn update_job(&self, id: &JobId, payload: JobPayload) -> Result<Job>;

    async fn delete_job(&self, id: &JobId) -> Result<()>;
}
