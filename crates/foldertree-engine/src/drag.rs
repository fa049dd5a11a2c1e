//! Drag-and-drop state machine.
//!
//! Idle → Dragging → Hovering → dropped or cancelled. Entirely local: only
//! a drop on a legal target produces a [`MoveIntent`] for the coordinator.

use serde::{Deserialize, Serialize};
use tracing::debug;

use foldertree_core::types::FolderId;

use crate::graph::FolderGraph;
use crate::validator::MoveError;

/// Where a dragged folder would land.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropTarget {
    /// The root level of the tree.
    Root,
    /// Inside another folder.
    Folder(FolderId),
}

impl DropTarget {
    /// The parent id a drop here assigns.
    pub fn parent_id(&self) -> Option<&FolderId> {
        match self {
            Self::Root => None,
            Self::Folder(id) => Some(id),
        }
    }
}

/// A validated request to reparent a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveIntent {
    /// Folder being moved.
    pub folder_id: FolderId,
    /// New parent (None = root level).
    pub new_parent_id: Option<FolderId>,
}

/// Current phase of a drag gesture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A folder is picked up but not over any target.
    Dragging {
        /// Folder being dragged.
        source: FolderId,
    },
    /// A folder is over a target.
    Hovering {
        /// Folder being dragged.
        source: FolderId,
        /// Target under the pointer.
        target: DropTarget,
        /// Verdict for dropping here.
        verdict: Result<(), MoveError>,
    },
}

/// How a gesture ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Dropped on a legal target.
    Move(MoveIntent),
    /// Dropped on an illegal target; nothing changes.
    Rejected(MoveError),
    /// Released outside any target, or aborted.
    Cancelled,
}

/// One drag gesture.
#[derive(Debug, Clone, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    /// An idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Pick up `source`. Restarts any gesture in progress.
    pub fn begin(&mut self, source: FolderId) {
        debug!(folder_id = %source, "Drag started");
        self.state = DragState::Dragging { source };
    }

    /// Move the pointer over `target`, returning whether a drop there would
    /// be accepted. Ignored when nothing is being dragged.
    pub fn hover(&mut self, graph: &FolderGraph, target: DropTarget) -> Result<(), MoveError> {
        let source = match &self.state {
            DragState::Idle => return Ok(()),
            DragState::Dragging { source } | DragState::Hovering { source, .. } => source.clone(),
        };
        let verdict = graph.validator().can_move(&source, target.parent_id());
        self.state = DragState::Hovering {
            source,
            target,
            verdict,
        };
        verdict
    }

    /// Move the pointer off any target.
    pub fn leave(&mut self) {
        if let DragState::Hovering { source, .. } = &self.state {
            self.state = DragState::Dragging {
                source: source.clone(),
            };
        }
    }

    /// Release the pointer, ending the gesture.
    pub fn drop_here(&mut self) -> DropOutcome {
        match std::mem::take(&mut self.state) {
            DragState::Hovering {
                source,
                target,
                verdict: Ok(()),
            } => DropOutcome::Move(MoveIntent {
                folder_id: source,
                new_parent_id: target.parent_id().cloned(),
            }),
            DragState::Hovering {
                verdict: Err(err), ..
            } => DropOutcome::Rejected(err),
            DragState::Idle | DragState::Dragging { .. } => DropOutcome::Cancelled,
        }
    }

    /// Abort the gesture (escape key).
    pub fn cancel(&mut self) -> DropOutcome {
        self.state = DragState::Idle;
        DropOutcome::Cancelled
    }
}
