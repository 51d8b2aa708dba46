use serde::{Deserialize, Serialize};

use crate::board::job::{Job, JobId, JobType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most recent posting first
    #[default]
    Newest,
    /// Oldest posting first
    Oldest,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Newest => write!(f, "newest"),
            SortOrder::Oldest => write!(f, "oldest"),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            other => Err(format!(
                "unknown sort order '{}', expected newest or oldest",
                other
            )),
        }
    }
}

/// Sequence number handed out for each fetch of the job collection.
/// Only the most recently issued ticket may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

/// In-memory view of the job board: the collection last confirmed by the
/// backend plus the user's current search, filter, sort and edit intent.
#[derive(Debug, Default)]
pub struct JobListViewModel {
    jobs: Vec<Job>,
    search_term: String,
    type_filter: Option<JobType>,
    sort_order: SortOrder,
    editing: Option<JobId>,
    issued: u64,
    applied: u64,
}

impl JobListViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the authoritative collection. Filter and sort state are kept;
    /// edit mode drops back to create if its target is gone.
    pub fn set_jobs(&mut self, jobs: Vec<Job>) {
        self.jobs = jobs;
        if let Some(id) = &self.editing {
            if !self.jobs.iter().any(|j| &j.id == id) {
                tracing::debug!(job_id = %id, "Edit target no longer present, back to create mode");
                self.editing = None;
            }
        }
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn set_search_term(&mut self, text: impl Into<String>) {
        self.search_term = text.into();
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_type_filter(&mut self, job_type: Option<JobType>) {
        self.type_filter = job_type;
    }

    pub fn type_filter(&self) -> Option<&JobType> {
        self.type_filter.as_ref()
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.sort_order = order;
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Jobs matching the current search and type filter, ordered by posting
    /// date. Jobs with equal dates keep their collection order.
    pub fn visible_jobs(&self) -> Vec<&Job> {
        let needle = self.search_term.to_lowercase();
        let mut visible: Vec<&Job> = self
            .jobs
            .iter()
            .filter(|job| {
                needle.is_empty()
                    || job.title.to_lowercase().contains(&needle)
                    || job.company.to_lowercase().contains(&needle)
            })
            .filter(|job| match &self.type_filter {
                Some(wanted) => job.job_type.as_ref() == Some(wanted),
                None => true,
            })
            .collect();

        match self.sort_order {
            SortOrder::Newest => visible.sort_by(|a, b| b.posting_date.cmp(&a.posting_date)),
            SortOrder::Oldest => visible.sort_by(|a, b| a.posting_date.cmp(&b.posting_date)),
        }
        visible
    }

    /// Switch to edit mode for `id`. Unknown ids leave the current mode as is.
    pub fn begin_edit(&mut self, id: &JobId) -> bool {
        if self.jobs.iter().any(|j| &j.id == id) {
            self.editing = Some(id.clone());
            true
        } else {
            tracing::debug!(job_id = %id, "Ignoring edit of unknown job");
            false
        }
    }

    pub fn begin_create(&mut self) {
        self.editing = None;
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn editing_id(&self) -> Option<&JobId> {
        self.editing.as_ref()
    }

    pub fn current_edit_target(&self) -> Option<&Job> {
        let id = self.editing.as_ref()?;
        self.jobs.iter().find(|j| &j.id == id)
    }

    /// Issue a ticket for a new fetch. Any ticket issued earlier becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    /// Apply a fetch result if its ticket is still current. Returns false when
    /// the result was discarded as stale.
    pub fn apply_fetch(&mut self, ticket: FetchTicket, jobs: Vec<Job>) -> bool {
        if ticket.0 != self.issued || ticket.0 <= self.applied {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.issued,
                "Discarding stale fetch result"
            );
            return false;
        }
        self.applied = ticket.0;
        self.set_jobs(jobs);
        true
    }

    /// Invalidate every fetch currently in flight.
    pub fn cancel_pending(&mut self) {
        self.issued += 1;
    }
}
