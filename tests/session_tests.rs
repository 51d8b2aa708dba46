use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::{oneshot, Mutex};

use jobboard::board::{Job, JobForm, JobId, JobPayload, JobType};
use jobboard::session::{JobBoard, Submitted};
use jobboard::store::{JobStore, MemoryJobStore};
use jobboard::{BoardError, Result};

fn job(id: u64, title: &str, day: u32) -> Job {
    Job {
        id: JobId::from(id),
        title: title.to_string(),
        company: "Acme".to_string(),
        location: "Remote".to_string(),
        job_type: Some(JobType::FullTime),
        tags: Vec::new(),
        posting_date: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
    }
}

fn form(title: &str, company: &str) -> JobForm {
    JobForm {
        title: title.to_string(),
        company: company.to_string(),
        location: " Berlin ".to_string(),
        job_type: Some(JobType::Contract),
        tags: "rust, tokio".to_string(),
    }
}

/// Store whose list responses are released by the test, one gate per call.
#[derive(Default)]
struct GatedStore {
    gates: Mutex<VecDeque<oneshot::Receiver<Vec<Job>>>>,
}

impl GatedStore {
    async fn gate(&self) -> oneshot::Sender<Vec<Job>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().await.push_back(rx);
        tx
    }

    async fn queued(&self) -> usize {
        self.gates.lock().await.len()
    }
}

#[async_trait]
impl JobStore for GatedStore {
    async fn list_jobs(&self) -> Result<Vec<Job>> {
        let gate = self.gates.lock().await.pop_front();
        match gate {
            Some(rx) => rx
                .await
                .map_err(|_| BoardError::Transport("gate dropped".to_string())),
            None => Err(BoardError::Transport("no gate queued".to_string())),
        }
    }

    async fn create_job(&self, _payload: JobPayload) -> Result<Job> {
        Err(BoardError::Internal("not supported".to_string()))
    }

    async fn update_job(&self, id: &JobId, _payload: JobPayload) -> Result<Job> {
        Err(BoardError::NotFound(id.clone()))
    }

    async fn delete_job(&self, id: &JobId) -> Result<()> {
        Err(BoardError::NotFound(id.clone()))
    }
}

/// Store that is always unreachable.
struct DownStore;

#[async_trait]
impl JobStore for DownStore {
    async fn list_jobs(&self) -> Result<Vec<Job>> {
        Err(BoardError::Transport("connection refused".to_string()))
    }

    async fn create_job(&self, _payload: JobPayload) -> Result<Job> {
        Err(BoardError::Transport("connection refused".to_string()))
    }

    async fn update_job(&self, _id: &JobId, _payload: JobPayload) -> Result<Job> {
        Err(BoardError::Transport("connection refused".to_string()))
    }

    async fn delete_job(&self, _id: &JobId) -> Result<()> {
        Err(BoardError::Transport("connection refused".to_string()))
    }
}

/// Store that accepts every change but cannot list jobs once `listing_down`
/// is set.
struct ListDownStore {
    inner: MemoryJobStore,
    listing_down: AtomicBool,
}

impl ListDownStore {
    fn new(jobs: Vec<Job>) -> Self {
        Self {
            inner: MemoryJobStore::with_jobs(jobs),
            listing_down: AtomicBool::new(false),
        }
    }

    fn take_listing_down(&self) {
        self.listing_down.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl JobStore for ListDownStore {
    async fn list_jobs(&self) -> Result<Vec<Job>> {
        if self.listing_down.load(Ordering::SeqCst) {
            return Err(BoardError::Transport("connection reset".to_string()));
        }
        self.inner.list_jobs().await
    }

    async fn create_job(&self, payload: JobPayload) -> Result<Job> {
        self.inner.create_job(payload).await
    }

    async fn update_job(&self, id: &JobId, payload: JobPayload) -> Result<Job> {
        self.inner.update_job(id, payload).await
    }

    async fn delete_job(&self, id: &JobId) -> Result<()> {
        self.inner.delete_job(id).await
    }
}

/// Wait until the gated store has handed out gates down to `remaining`.
async fn wait_for_queued(store: &GatedStore, remaining: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while store.queued().await != remaining {
        assert!(
            tokio::time::Instant::now() < deadline,
            "fetch never started"
        );
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_refresh_loads_jobs_newest_first() {
    let store = Arc::new(MemoryJobStore::with_jobs(vec![
        job(1, "Dev", 9),
        job(2, "PM", 10),
    ]));
    let board = JobBoard::new(store);

    assert!(board.refresh().await.unwrap());
    let visible = board.visible_jobs().await;
    assert_eq!(visible.len(), 2);
    assert_eq!(visible[0].id, JobId::from(2u64));
}

#[tokio::test]
async fn test_create_submit_refetches() {
    let store = Arc::new(MemoryJobStore::new());
    let board = JobBoard::new(store.clone());

    let saved = board.submit(&form("  Rust Dev ", "Acme")).await.unwrap();
    assert!(saved.refreshed());
    let created = match saved.outcome {
        Submitted::Created(job) => job,
        other => panic!("expected create, got {:?}", other),
    };
    assert_eq!(created.title, "Rust Dev");
    assert_eq!(created.location, "Berlin");
    assert_eq!(created.tags, vec!["rust", "tokio"]);

    let visible = board.visible_jobs().await;
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, created.id);
}

#[tokio::test]
async fn test_edit_submit_updates_and_returns_to_create() {
    let store = Arc::new(MemoryJobStore::with_jobs(vec![job(1, "Dev", 9)]));
    let board = JobBoard::new(store.clone());
    board.refresh().await.unwrap();

    let mut prefilled = board.begin_edit(&JobId::from(1u64)).await.unwrap();
    assert_eq!(prefilled.title, "Dev");
    prefilled.title = "Senior Dev".to_string();

    let submitted = board.submit(&prefilled).await.unwrap().outcome;
    assert!(matches!(submitted, Submitted::Updated(_)));
    assert_eq!(submitted.job().id, JobId::from(1u64));

    assert!(!board.read(|v| v.is_editing()).await);
    assert_eq!(store.len().await, 1);
    assert_eq!(board.visible_jobs().await[0].title, "Senior Dev");
}

#[tokio::test]
async fn test_begin_edit_unknown_job_returns_none() {
    let store = Arc::new(MemoryJobStore::with_jobs(vec![job(1, "Dev", 9)]));
    let board = JobBoard::new(store);
    board.refresh().await.unwrap();

    assert!(board.begin_edit(&JobId::from(7u64)).await.is_none());
    assert!(!board.read(|v| v.is_editing()).await);
}

#[tokio::test]
async fn test_failed_submit_leaves_state_untouched() {
    let store = Arc::new(MemoryJobStore::with_jobs(vec![job(1, "Dev", 9)]));
    let board = JobBoard::new(store);
    board.refresh().await.unwrap();
    board.begin_edit(&JobId::from(1u64)).await.unwrap();

    let err = board.submit(&form("   ", "Acme")).await.unwrap_err();
    assert!(matches!(err, BoardError::Validation(_)));

    assert!(board.read(|v| v.is_editing()).await);
    assert_eq!(board.visible_jobs().await[0].title, "Dev");
}

#[tokio::test]
async fn test_delete_refetches_and_drops_edit_target() {
    let store = Arc::new(MemoryJobStore::with_jobs(vec![
        job(1, "Dev", 9),
        job(2, "PM", 10),
    ]));
    let board = JobBoard::new(store);
    board.refresh().await.unwrap();
    board.begin_edit(&JobId::from(1u64)).await.unwrap();

    assert!(board.delete(&JobId::from(1u64)).await.unwrap().refreshed());

    let visible = board.visible_jobs().await;
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, JobId::from(2u64));
    assert!(!board.read(|v| v.is_editing()).await);
}

#[tokio::test]
async fn test_delete_unknown_job_is_not_found() {
    let store = Arc::new(MemoryJobStore::with_jobs(vec![job(1, "Dev", 9)]));
    let board = JobBoard::new(store);
    board.refresh().await.unwrap();

    let err = board.delete(&JobId::from(5u64)).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(board.visible_jobs().await.len(), 1);
}

#[tokio::test]
async fn test_transport_failure_keeps_previous_state() {
    let board = JobBoard::new(Arc::new(DownStore));
    board.view().write().await.set_jobs(vec![job(1, "Dev", 9)]);
    board.view().write().await.begin_edit(&JobId::from(1u64));

    assert!(board.refresh().await.unwrap_err().is_transport());
    assert!(board.submit(&form("Dev", "Acme")).await.unwrap_err().is_transport());
    assert!(board
        .delete(&JobId::from(1u64))
        .await
        .unwrap_err()
        .is_transport());

    assert_eq!(board.visible_jobs().await.len(), 1);
    assert!(board.read(|v| v.is_editing()).await);
}

#[tokio::test]
async fn test_filters_survive_refresh() {
    let store = Arc::new(MemoryJobStore::with_jobs(vec![
        job(1, "Dev", 9),
        job(2, "PM", 10),
    ]));
    let board = JobBoard::new(store.clone());
    board.set_search_term("pm").await;
    board.refresh().await.unwrap();
    assert_eq!(board.visible_jobs().await.len(), 1);

    board.submit(&form("PMO lead", "Acme")).await.unwrap();
    let titles: Vec<String> = board
        .visible_jobs()
        .await
        .into_iter()
        .map(|j| j.title)
        .collect();
    assert_eq!(titles.len(), 2);
    assert!(titles.contains(&"PMO lead".to_string()));
}

#[tokio::test]
async fn test_stale_response_does_not_overwrite_newer() {
    let store = Arc::new(GatedStore::default());
    let board = JobBoard::new(store.clone());

    let older_gate = store.gate().await;
    let newer_gate = store.gate().await;

    let older = tokio::spawn({
        let board = board.clone();
        async move { board.refresh().await }
    });
    wait_for_queued(&store, 1).await;

    let newer = tokio::spawn({
        let board = board.clone();
        async move { board.refresh().await }
    });
    wait_for_queued(&store, 0).await;

    newer_gate.send(vec![job(2, "Newer", 10)]).unwrap();
    assert!(newer.await.unwrap().unwrap());

    older_gate.send(vec![job(1, "Older", 9)]).unwrap();
    assert!(!older.await.unwrap().unwrap());

    let visible = board.visible_jobs().await;
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].title, "Newer");
}

#[tokio::test]
async fn test_superseded_response_is_discarded_even_if_first() {
    let store = Arc::new(GatedStore::default());
    let board = JobBoard::new(store.clone());

    let older_gate = store.gate().await;
    let newer_gate = store.gate().await;

    let older = tokio::spawn({
        let board = board.clone();
        async move { board.refresh().await }
    });
    wait_for_queued(&store, 1).await;
    let newer = tokio::spawn({
        let board = board.clone();
        async move { board.refresh().await }
    });
    wait_for_queued(&store, 0).await;

    older_gate.send(vec![job(1, "Older", 9)]).unwrap();
    assert!(!older.await.unwrap().unwrap());
    assert!(board.visible_jobs().await.is_empty());

    newer_gate.send(vec![job(2, "Newer", 10)]).unwrap();
    assert!(newer.await.unwrap().unwrap());
    assert_eq!(board.visible_jobs().await[0].title, "Newer");
}

#[tokio::test]
async fn test_cancel_pending_discards_in_flight_fetch() {
    let store = Arc::new(GatedStore::default());
    let board = JobBoard::new(store.clone());

    let gate = store.gate().await;
    let pending = tokio::spawn({
        let board = board.clone();
        async move { board.refresh().await }
    });
    wait_for_queued(&store, 0).await;

    board.cancel_pending().await;
    gate.send(vec![job(1, "Dev", 9)]).unwrap();

    assert!(!pending.await.unwrap().unwrap());
    assert!(board.visible_jobs().await.is_empty());
}

#[tokio::test]
async fn test_create_succeeds_when_only_refetch_fails() {
    let store = Arc::new(ListDownStore::new(Vec::new()));
    let board = JobBoard::new(store.clone());
    board.refresh().await.unwrap();
    store.take_listing_down();

    let saved = board.submit(&form("Rust Dev", "Acme")).await.unwrap();
    assert!(matches!(saved.outcome, Submitted::Created(_)));
    assert!(!saved.refreshed());
    assert!(saved.refresh_error.as_ref().unwrap().is_transport());

    assert_eq!(store.inner.len().await, 1);
    // The list on screen is behind the backend until the next refresh.
    assert!(board.visible_jobs().await.is_empty());
}

#[tokio::test]
async fn test_update_and_delete_succeed_when_only_refetch_fails() {
    let store = Arc::new(ListDownStore::new(vec![job(1, "Dev", 9), job(2, "PM", 10)]));
    let board = JobBoard::new(store.clone());
    board.refresh().await.unwrap();
    let mut prefilled = board.begin_edit(&JobId::from(1u64)).await.unwrap();
    prefilled.title = "Senior Dev".to_string();
    store.take_listing_down();

    let saved = board.submit(&prefilled).await.unwrap();
    assert_eq!(saved.outcome.job().title, "Senior Dev");
    assert!(saved.refresh_error.is_some());
    assert!(!board.read(|v| v.is_editing()).await);

    let deleted = board.delete(&JobId::from(2u64)).await.unwrap();
    assert!(deleted.refresh_error.unwrap().is_transport());
    assert_eq!(store.inner.len().await, 1);
    assert_eq!(board.visible_jobs().await.len(), 2);
}
