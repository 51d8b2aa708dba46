use serde::{Deserialize, Serialize};

use crate::board::job::{Job, JobPayload, JobType};

/// Raw, unnormalized contents of the job form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobForm {
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: Option<JobType>,
    /// Comma-separated tag list as typed by the user.
    pub tags: String,
}

impl JobForm {
    /// Prefill the form with an existing job, for editing.
    pub fn from_job(job: &Job) -> Self {
        Self {
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            job_type: job.job_type.clone(),
            tags: job.tags.join(", "),
        }
    }
}

/// Normalize form input into the payload sent to the store.
///
/// Text fields are trimmed. Tags are split on commas, trimmed, and empty
/// entries are dropped: `"a,,b"` gives `["a", "b"]` and `"  "` gives `[]`,
/// never a list holding `""`. A naive split-and-trim would keep those empty
/// strings, so the backend can see fewer tags than commas typed. `id` and
/// `posting_date` belong to the backend and are never part of the payload.
pub fn build_submission(form: &JobForm) -> JobPayload {
    JobPayload {
        title: form.title.trim().to_string(),
        company: form.company.trim().to_string(),
        location: form.location.trim().to_string(),
        job_type: form.job_type.clone(),
        tags: split_tags(&form.tags),
    }
}

/// Blank elements are skipped rather than kept as `""` tags.
fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
