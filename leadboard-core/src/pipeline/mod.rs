//! Kanban pipeline: classification, scoring, board view model, sync and drag.
//!
//! ```text
//! LeadStore ──fetch──▶ classify/score ──▶ board views ──▶ columns
//!     ▲                                                      │
//!     └──── persist ◀── SyncController ◀── DragController ◀──┘ drop
//! ```

pub mod classify;
pub mod drag;
pub mod poller;
pub mod score;
pub mod sync;
pub mod view;

pub use classify::{classify, unclassify};
pub use drag::{DragController, DragState, PendingMove};
pub use poller::{IntervalTicker, ManualTicker, MountedBoard, Poller, TickHandle, Ticker};
pub use score::{score, tier};
pub use sync::{FetchOutcome, MoveOutcome, SyncController, SyncEvent, SyncState};
pub use view::{
    column, column_summaries, format_currency, move_local, rebuild, BoardStats, ColumnSummary,
};
