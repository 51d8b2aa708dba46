use std::sync::Arc;

use tokio::sync::RwLock;

use crate::board::{build_submission, Job, JobForm, JobId, JobListViewModel, JobType, SortOrder};
use crate::error::{BoardError, Result};
use crate::store::JobStore;

/// Outcome of a submitted form.
#[derive(Debug, Clone, PartialEq)]
pub enum Submitted {
    Created(Job),
    Updated(Job),
}

impl Submitted {
    pub fn job(&self) -> &Job {
        match self {
            Submitted::Created(job) | Submitted::Updated(job) => job,
        }
    }
}

/// A mutation the store accepted.
///
/// `refresh_error` holds the failure of the refetch that follows the mutation.
/// The mutation itself stands either way; only the displayed list is behind.
#[derive(Debug)]
pub struct Saved<T> {
    pub outcome: T,
    pub refresh_error: Option<BoardError>,
}

impl<T> Saved<T> {
    pub fn refreshed(&self) -> bool {
        self.refresh_error.is_none()
    }
}

/// Couples a `JobStore` with the view-model.
///
/// Every mutation is followed by a full refetch. Failed store calls leave the
/// view-model untouched. The view-model lock is never held across a store call.
#[derive(Clone)]
pub struct JobBoard {
    store: Arc<dyn JobStore>,
    view: Arc<RwLock<JobListViewModel>>,
}

impl JobBoard {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            store,
            view: Arc::new(RwLock::new(JobListViewModel::new())),
        }
    }

    pub fn view(&self) -> Arc<RwLock<JobListViewModel>> {
        Arc::clone(&self.view)
    }

    /// Run `f` against the view-model under a read lock.
    pub async fn read<R>(&self, f: impl FnOnce(&JobListViewModel) -> R) -> R {
        let view = self.view.read().await;
        f(&view)
    }

    /// Snapshot of the currently visible jobs.
    pub async fn visible_jobs(&self) -> Vec<Job> {
        self.read(|v| v.visible_jobs().into_iter().cloned().collect())
            .await
    }

    pub async fn set_search_term(&self, text: impl Into<String>) {
        self.view.write().await.set_search_term(text);
    }

    pub async fn set_type_filter(&self, job_type: Option<JobType>) {
        self.view.write().await.set_type_filter(job_type);
    }

    pub async fn set_sort_order(&self, order: SortOrder) {
        self.view.write().await.set_sort_order(order);
    }

    /// Enter edit mode for `id` and return a form prefilled from that job.
    /// Returns `None` and leaves the mode unchanged if the job is unknown.
    pub async fn begin_edit(&self, id: &JobId) -> Option<JobForm> {
        let mut view = self.view.write().await;
        if !view.begin_edit(id) {
            return None;
        }
        view.current_edit_target().map(JobForm::from_job)
    }

    pub async fn begin_create(&self) {
        self.view.write().await.begin_create();
    }

    /// Fetch the collection from the store. Returns false if a newer fetch
    /// was issued (or pending fetches were cancelled) while this one ran.
    pub async fn refresh(&self) -> Result<bool> {
        let ticket = self.view.write().await.begin_fetch();
        let jobs = self.store.list_jobs().await?;
        let count = jobs.len();
        let applied = self.view.write().await.apply_fetch(ticket, jobs);
        if applied {
            tracing::debug!(ticket = ticket.seq(), count, "Job list refreshed");
        }
        Ok(applied)
    }

    /// Discard the effect of every fetch still in flight.
    pub async fn cancel_pending(&self) {
        self.view.write().await.cancel_pending();
    }

    /// Submit the form: update the edit target in edit mode, create a job
    /// otherwise. On success the board returns to create mode and refetches.
    /// `Err` means the store rejected the change; a failed refetch is reported
    /// in `Saved::refresh_error` instead.
    pub async fn submit(&self, form: &JobForm) -> Result<Saved<Submitted>> {
        let payload = build_submission(form);
        let target = self.view.read().await.editing_id().cloned();

        let submitted = match &target {
            Some(id) => Submitted::Updated(self.store.update_job(id, payload).await?),
            None => Submitted::Created(self.store.create_job(payload).await?),
        };

        {
            // Re-targeted while the request ran: keep the newer edit.
            let mut view = self.view.write().await;
            if view.editing_id() == target.as_ref() {
                view.begin_create();
            }
        }
        Ok(Saved {
            outcome: submitted,
            refresh_error: self.refresh_after_mutation().await,
        })
    }

    /// Delete a job, then refetch.
    pub async fn delete(&self, id: &JobId) -> Result<Saved<()>> {
        self.store.delete_job(id).await?;
        Ok(Saved {
            outcome: (),
            refresh_error: self.refresh_after_mutation().await,
        })
    }

    async fn refresh_after_mutation(&self) -> Option<BoardError> {
        match self.refresh().await {
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Change saved but job list refetch failed");
                Some(e)
            }
        }
    }
}
