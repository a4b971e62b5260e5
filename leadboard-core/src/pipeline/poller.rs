//! Background board refresh
//!
//! A [`Poller`] runs `fetch_all` on every tick of a [`Ticker`] until stopped.
//! The ticker is injected: [`IntervalTicker`] for real time, [`ManualTicker`]
//! for tests that fire ticks by hand.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};

use super::sync::SyncController;

/// Source of poll ticks.
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick. `false` means no more ticks will come.
    async fn tick(&mut self) -> bool;
}

/// Wall-clock ticker. The first tick fires one period after creation.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let start = tokio::time::Instant::now() + period;
        let mut interval = tokio::time::interval_at(start, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Ticker driven through a [`TickHandle`].
pub struct ManualTicker {
    rx: mpsc::UnboundedReceiver<()>,
}

/// Fires ticks on its [`ManualTicker`]. Dropping it ends the ticker.
#[derive(Clone)]
pub struct TickHandle {
    tx: mpsc::UnboundedSender<()>,
}

impl ManualTicker {
    pub fn new() -> (Self, TickHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, TickHandle { tx })
    }
}

impl TickHandle {
    /// Queue one tick. Returns `false` if the ticker is gone.
    pub fn tick(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

#[async_trait]
impl Ticker for ManualTicker {
    async fn tick(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}

/// Running background refresh loop, tied to the board's mount lifetime.
pub struct Poller {
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<usize>>,
}

impl Poller {
    /// Spawn the refresh loop on the current tokio runtime.
    pub fn start<T>(controller: SyncController, mut ticker: T) -> Self
    where
        T: Ticker + 'static,
    {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut polls = 0usize;
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    more = ticker.tick() => {
                        if !more {
                            tracing::debug!("Ticker exhausted, poller exiting");
                            break;
                        }
                        polls += 1;
                        let outcome = controller.fetch_all().await;
                        tracing::trace!(poll = polls, ?outcome, "Poll tick");
                    }
                }
            }
            polls
        });

        tracing::debug!("Poller started");
        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the loop and wait for it to exit. Returns the number of polls run.
    ///
    /// A fetch already in progress is allowed to finish.
    pub async fn stop(mut self) -> usize {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        let polls = match self.handle.take() {
            Some(handle) => handle.await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Poller task ended abnormally");
                0
            }),
            None => 0,
        };
        tracing::debug!(polls, "Poller stopped");
        polls
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// A mounted board: controller plus its running poller.
///
/// `mount` does an initial fetch and starts polling; `unmount` stops polling
/// and makes late fetch results no-ops.
pub struct MountedBoard {
    controller: SyncController,
    poller: Poller,
}

impl MountedBoard {
    pub async fn mount<T>(controller: SyncController, ticker: T) -> Self
    where
        T: Ticker + 'static,
    {
        controller.remount();
        controller.fetch_all().await;
        let poller = Poller::start(controller.clone(), ticker);
        Self { controller, poller }
    }

    pub fn controller(&self) -> &SyncController {
        &self.controller
    }

    pub async fn unmount(self) -> usize {
        self.controller.unmount();
        self.poller.stop().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::pipeline::SyncEvent;
    use crate::store::LeadStore;
    use crate::types::RemoteLead;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingStore {
        lists: AtomicUsize,
    }

    #[async_trait]
    impl LeadStore for CountingStore {
        async fn list_leads(&self) -> Result<Vec<RemoteLead>> {
            let n = self.lists.fetch_add(1, Ordering::SeqCst) + 1;
            Ok((0..n).map(|i| RemoteLead::new(format!("l{}", i))).collect())
        }

        async fn update_status(&self, _id: &str, _status: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_manual_ticks_drive_fetches() {
        let store = Arc::new(CountingStore::default());
        let controller = SyncController::new(store.clone());
        let mut events = controller.subscribe();
        let (ticker, ticks) = ManualTicker::new();

        let poller = Poller::start(controller.clone(), ticker);
        assert!(ticks.tick());
        assert!(ticks.tick());
        for expected in 1..=2 {
            assert_eq!(
                events.recv().await.unwrap(),
                SyncEvent::Refreshed { count: expected }
            );
        }
        assert!(poller.is_running());

        assert_eq!(poller.stop().await, 2);
        assert_eq!(store.lists.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhausted_ticker_runs_every_queued_tick() {
        let store = Arc::new(CountingStore::default());
        let controller = SyncController::new(store.clone());
        let (ticker, ticks) = ManualTicker::new();
        ticks.tick();
        ticks.tick();
        ticks.tick();
        drop(ticks);

        let mut events = controller.subscribe();
        let poller = Poller::start(controller.clone(), ticker);
        for _ in 0..3 {
            events.recv().await.unwrap();
        }
        assert_eq!(store.lists.load(Ordering::SeqCst), 3);
        assert_eq!(controller.leads().len(), 3);
        assert_eq!(poller.stop().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_ticker_waits_one_period() {
        let mut ticker = IntervalTicker::new(Duration::from_secs(30));
        let start = tokio::time::Instant::now();
        assert!(ticker.tick().await);
        assert!(start.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_mount_fetches_and_unmount_stops() {
        let store = Arc::new(CountingStore::default());
        let controller = SyncController::new(store.clone());
        let (ticker, _ticks) = ManualTicker::new();

        let board = MountedBoard::mount(controller.clone(), ticker).await;
        assert_eq!(board.controller().leads().len(), 1);

        board.unmount().await;
        assert!(!controller.is_mounted());
        assert_eq!(store.lists.load(Ordering::SeqCst), 1);
    }
}
