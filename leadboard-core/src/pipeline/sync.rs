//! Sync controller
//!
//! Keeps the board consistent with the leads API:
//! - `fetch_all` pulls every lead and replaces the board wholesale
//! - `move_and_persist` moves a card locally first, then writes the new status
//! - a failed write is not rolled back individually; the board is refetched
//!
//! ## Concurrency
//!
//! A poll fetch and a persist may be in flight at the same time. Nothing
//! serializes them. Whichever fetch completes last wins, so a poll that lands
//! between an optimistic move and the server recording it will show the card
//! back in its old column until the next poll.
//!
//! No public operation returns an error. Failures come back as outcome values
//! and are logged and broadcast as [`SyncEvent`]s.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::store::LeadStore;
use crate::types::{PipelineLeadView, PipelineStage};

use super::classify::unclassify;
use super::view::{move_local, rebuild, stage_of};

const EVENT_CAPACITY: usize = 64;

/// What the controller is doing right now.
///
/// Overlapping fetch and persist is reported as `Fetching`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Fetching,
    Persisting,
}

/// Result of a [`SyncController::fetch_all`]
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Board replaced with `count` leads
    Refreshed { count: usize },
    /// Board left untouched
    Failed { error: String },
    /// Fetch completed after unmount; result dropped
    Discarded,
}

impl FetchOutcome {
    pub fn is_refreshed(&self) -> bool {
        matches!(self, FetchOutcome::Refreshed { .. })
    }
}

/// Result of a [`SyncController::move_and_persist`]
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// Server accepted the new status
    Persisted,
    /// Lead is not on the board; nothing was sent
    UnknownLead,
    /// Board is unmounted; nothing was moved or sent
    Discarded,
    /// Write failed and the board was refetched
    Resynced { error: String, fetch: FetchOutcome },
}

/// Board change notifications for whoever renders the board
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Refreshed { count: usize },
    FetchFailed { error: String },
    Moved { id: String, stage: PipelineStage },
    PersistFailed { id: String, error: String },
}

#[derive(Debug, Default)]
struct BoardState {
    leads: Vec<PipelineLeadView>,
    last_fetched_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

struct Shared {
    board: Mutex<BoardState>,
    mounted: AtomicBool,
    fetches_in_flight: AtomicUsize,
    persists_in_flight: AtomicUsize,
    events: broadcast::Sender<SyncEvent>,
}

/// Decrements an in-flight counter when dropped, so a failed or cancelled
/// call never leaves the controller stuck outside `Idle`.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        InFlight(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Owns the board and its synchronization with a [`LeadStore`].
///
/// Cheap to clone; clones share the same board.
#[derive(Clone)]
pub struct SyncController {
    store: Arc<dyn LeadStore>,
    shared: Arc<Shared>,
}

impl SyncController {
    /// Create a mounted controller with an empty board.
    pub fn new(store: Arc<dyn LeadStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            shared: Arc::new(Shared {
                board: Mutex::new(BoardState::default()),
                mounted: AtomicBool::new(true),
                fetches_in_flight: AtomicUsize::new(0),
                persists_in_flight: AtomicUsize::new(0),
                events,
            }),
        }
    }

    fn board(&self) -> MutexGuard<'_, BoardState> {
        self.shared
            .board
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: SyncEvent) {
        // No subscribers is fine.
        let _ = self.shared.events.send(event);
    }

    /// Pull every lead from the store and replace the board.
    pub async fn fetch_all(&self) -> FetchOutcome {
        let _in_flight = InFlight::enter(&self.shared.fetches_in_flight);

        let result = self.store.list_leads().await;

        if !self.is_mounted() {
            tracing::debug!("Board unmounted, discarding fetch result");
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(remote) => {
                let views = rebuild(&remote);
                let count = views.len();
                {
                    let mut board = self.board();
                    board.leads = views;
                    board.last_fetched_at = Some(Utc::now());
                    board.last_error = None;
                }
                tracing::debug!(count, "Board refreshed");
                self.emit(SyncEvent::Refreshed { count });
                FetchOutcome::Refreshed { count }
            }
            Err(e) => {
                let error = e.to_string();
                tracing::warn!(error = %error, "Failed to fetch leads, keeping current board");
                self.board().last_error = Some(error.clone());
                self.emit(SyncEvent::FetchFailed {
                    error: error.clone(),
                });
                FetchOutcome::Failed { error }
            }
        }
    }

    /// Manual refresh. Same path as a poll tick.
    pub async fn refresh(&self) -> FetchOutcome {
        tracing::info!("Manual board refresh");
        self.fetch_all().await
    }

    /// Move a lead on the board immediately, then persist its new status.
    ///
    /// On a failed write the whole board is refetched from the store.
    pub async fn move_and_persist(&self, id: &str, stage: PipelineStage) -> MoveOutcome {
        if !self.is_mounted() {
            tracing::debug!(lead_id = %id, "Board unmounted, ignoring move");
            return MoveOutcome::Discarded;
        }
        {
            let mut board = self.board();
            if stage_of(&board.leads, id).is_none() {
                tracing::debug!(lead_id = %id, "Ignoring move of lead not on the board");
                return MoveOutcome::UnknownLead;
            }
            let leads = std::mem::take(&mut board.leads);
            board.leads = move_local(leads, id, stage);
        }
        self.emit(SyncEvent::Moved {
            id: id.to_string(),
            stage,
        });

        let status = unclassify(stage);
        let result = {
            let _in_flight = InFlight::enter(&self.shared.persists_in_flight);
            self.store.update_status(id, status).await
        };

        match result {
            Ok(()) => {
                tracing::info!(lead_id = %id, stage = %stage, status, "Persisted stage change");
                MoveOutcome::Persisted
            }
            Err(e) => {
                let error = e.to_string();
                tracing::warn!(
                    lead_id = %id,
                    stage = %stage,
                    error = %error,
                    "Failed to persist stage change, resyncing board"
                );
                self.emit(SyncEvent::PersistFailed {
                    id: id.to_string(),
                    error: error.clone(),
                });
                let fetch = self.fetch_all().await;
                MoveOutcome::Resynced { error, fetch }
            }
        }
    }

    /// Snapshot of the board.
    pub fn leads(&self) -> Vec<PipelineLeadView> {
        self.board().leads.clone()
    }

    /// Current stage of one lead.
    pub fn stage_of(&self, id: &str) -> Option<PipelineStage> {
        stage_of(&self.board().leads, id)
    }

    pub fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.board().last_fetched_at
    }

    /// Most recent fetch error, cleared by the next successful fetch.
    pub fn last_error(&self) -> Option<String> {
        self.board().last_error.clone()
    }

    pub fn state(&self) -> SyncState {
        if self.shared.fetches_in_flight.load(Ordering::SeqCst) > 0 {
            SyncState::Fetching
        } else if self.shared.persists_in_flight.load(Ordering::SeqCst) > 0 {
            SyncState::Persisting
        } else {
            SyncState::Idle
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.shared.events.subscribe()
    }

    pub fn is_mounted(&self) -> bool {
        self.shared.mounted.load(Ordering::SeqCst)
    }

    /// Stop applying fetch results and accepting moves. In-flight requests
    /// still complete.
    pub fn unmount(&self) {
        self.shared.mounted.store(false, Ordering::SeqCst);
        tracing::debug!("Board unmounted");
    }

    pub fn remount(&self) {
        self.shared.mounted.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::types::RemoteLead;
    use async_trait::async_trait;

    struct StaticStore {
        leads: Vec<RemoteLead>,
        fail_updates: bool,
    }

    #[async_trait]
    impl LeadStore for StaticStore {
        async fn list_leads(&self) -> Result<Vec<RemoteLead>> {
            Ok(self.leads.clone())
        }

        async fn update_status(&self, _id: &str, _status: &str) -> Result<()> {
            if self.fail_updates {
                Err(Error::Http("connection refused".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn controller(fail_updates: bool) -> SyncController {
        SyncController::new(Arc::new(StaticStore {
            leads: vec![RemoteLead::new("a").with_status("New")],
            fail_updates,
        }))
    }

    #[tokio::test]
    async fn test_starts_idle_and_empty() {
        let sync = controller(false);
        assert_eq!(sync.state(), SyncState::Idle);
        assert!(sync.leads().is_empty());
        assert!(sync.last_fetched_at().is_none());
        assert!(sync.is_mounted());
    }

    #[tokio::test]
    async fn test_fetch_records_timestamp() {
        let sync = controller(false);
        assert_eq!(sync.fetch_all().await, FetchOutcome::Refreshed { count: 1 });
        assert!(sync.last_fetched_at().is_some());
        assert_eq!(sync.state(), SyncState::Idle);
    }

    #[tokio::test]
    async fn test_unknown_lead_is_not_persisted() {
        let sync = controller(true);
        sync.fetch_all().await;
        let before = sync.leads();
        assert_eq!(
            sync.move_and_persist("zzz", PipelineStage::Closing).await,
            MoveOutcome::UnknownLead
        );
        assert_eq!(sync.leads(), before);
    }

    #[tokio::test]
    async fn test_failed_persist_resyncs() {
        let sync = controller(true);
        sync.fetch_all().await;
        let outcome = sync.move_and_persist("a", PipelineStage::Closing).await;
        match outcome {
            MoveOutcome::Resynced { fetch, .. } => assert!(fetch.is_refreshed()),
            other => panic!("expected Resynced, got {:?}", other),
        }
        assert_eq!(sync.stage_of("a"), Some(PipelineStage::New));
        assert_eq!(sync.state(), SyncState::Idle);
    }

    #[tokio::test]
    async fn test_unmounted_fetch_is_discarded() {
        let sync = controller(false);
        sync.unmount();
        assert_eq!(sync.fetch_all().await, FetchOutcome::Discarded);
        assert!(sync.leads().is_empty());
    }

    #[tokio::test]
    async fn test_unmounted_move_is_discarded() {
        let sync = controller(false);
        sync.fetch_all().await;
        sync.unmount();
        let mut events = sync.subscribe();

        assert_eq!(
            sync.move_and_persist("a", PipelineStage::Closing).await,
            MoveOutcome::Discarded
        );
        assert_eq!(sync.stage_of("a"), Some(PipelineStage::New));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_events_are_broadcast() {
        let sync = controller(false);
        let mut events = sync.subscribe();
        sync.fetch_all().await;
        sync.move_and_persist("a", PipelineStage::Showing).await;

        assert_eq!(events.recv().await.unwrap(), SyncEvent::Refreshed { count: 1 });
        assert_eq!(
            events.recv().await.unwrap(),
            SyncEvent::Moved {
                id: "a".to_string(),
                stage: PipelineStage::Showing
            }
        );
    }
}
