//! Drag-and-drop interaction layer
//!
//! Tracks which card is being dragged and which column is highlighted, and
//! turns a drop into a sync-controller move. Highlighting never mutates the
//! board. Any drag end, including an aborted one, clears all tracking.

use crate::types::{PipelineLeadView, PipelineStage};

use super::sync::{MoveOutcome, SyncController};
use super::view::stage_of;

/// Drag source and drop target tracking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragState {
    dragging: Option<String>,
    drop_target: Option<PipelineStage>,
}

/// A drop that needs persisting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMove {
    pub id: String,
    pub from: PipelineStage,
    pub to: PipelineStage,
}

impl DragState {
    pub fn drag_start(&mut self, id: impl Into<String>) {
        self.dragging = Some(id.into());
    }

    /// Pointer is over `stage`'s column.
    pub fn drag_over(&mut self, stage: PipelineStage) {
        self.drop_target = Some(stage);
    }

    /// Pointer left the highlighted column.
    pub fn drag_leave(&mut self) {
        self.drop_target = None;
    }

    /// Drag finished or was cancelled.
    pub fn drag_end(&mut self) {
        self.dragging = None;
        self.drop_target = None;
    }

    pub fn dragging(&self) -> Option<&str> {
        self.dragging.as_deref()
    }

    pub fn drop_target(&self) -> Option<PipelineStage> {
        self.drop_target
    }

    pub fn is_dragging(&self, id: &str) -> bool {
        self.dragging.as_deref() == Some(id)
    }

    pub fn is_drop_target(&self, stage: PipelineStage) -> bool {
        self.drop_target == Some(stage)
    }

    /// Resolve a drop on `stage` and clear tracking.
    ///
    /// Returns `None` when nothing is being dragged, the lead is no longer on
    /// the board, or it already sits in `stage`.
    pub fn take_drop(
        &mut self,
        stage: PipelineStage,
        views: &[PipelineLeadView],
    ) -> Option<PendingMove> {
        let id = self.dragging.take();
        self.drop_target = None;

        let id = id?;
        let from = stage_of(views, &id)?;
        if from == stage {
            return None;
        }
        Some(PendingMove {
            id,
            from,
            to: stage,
        })
    }
}

/// Binds drag gestures to a [`SyncController`].
pub struct DragController {
    state: DragState,
    sync: SyncController,
}

impl DragController {
    pub fn new(sync: SyncController) -> Self {
        Self {
            state: DragState::default(),
            sync,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn drag_start(&mut self, id: impl Into<String>) {
        self.state.drag_start(id);
    }

    pub fn drag_over(&mut self, stage: PipelineStage) {
        self.state.drag_over(stage);
    }

    pub fn drag_leave(&mut self) {
        self.state.drag_leave();
    }

    pub fn drag_end(&mut self) {
        self.state.drag_end();
    }

    /// Drop the dragged card on `stage`.
    ///
    /// Returns `None` when the drop was a no-op (same column, nothing dragged).
    pub async fn drop_on(&mut self, stage: PipelineStage) -> Option<MoveOutcome> {
        let pending = self.state.take_drop(stage, &self.sync.leads())?;
        tracing::debug!(
            lead_id = %pending.id,
            from = %pending.from,
            to = %pending.to,
            "Card dropped on new column"
        );
        Some(self.sync.move_and_persist(&pending.id, pending.to).await)
    }
}
