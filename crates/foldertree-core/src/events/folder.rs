//! Folder mutation events.

use serde::{Deserialize, Serialize};

use crate::types::{FolderId, MutationId, MutationKind, MutationState};

/// Lifecycle events of folder mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FolderEvent {
    /// A mutation was applied locally and dispatched to the remote store.
    Pending {
        /// The mutation.
        mutation_id: MutationId,
        /// What kind of mutation.
        kind: MutationKind,
        /// The folder it targets (provisional id for creates).
        folder_id: FolderId,
    },
    /// The remote store confirmed a mutation.
    Committed {
        /// The mutation.
        mutation_id: MutationId,
        /// What kind of mutation.
        kind: MutationKind,
        /// The folder it targets (server id for creates).
        folder_id: FolderId,
    },
    /// The remote store rejected a mutation and it was reverted.
    RolledBack {
        /// The mutation.
        mutation_id: MutationId,
        /// What kind of mutation.
        kind: MutationKind,
        /// The folder it targeted.
        folder_id: FolderId,
        /// The remote failure message.
        reason: String,
    },
    /// A provisional folder received its server-assigned id.
    IdAssigned {
        /// The locally generated id.
        provisional_id: FolderId,
        /// The id assigned by the remote store.
        folder_id: FolderId,
    },
    /// A subtree was removed by a committed delete.
    SubtreeDeleted {
        /// Root of the deleted subtree.
        folder_id: FolderId,
        /// Number of folders removed, including the root.
        folders_removed: usize,
        /// Summed item count of the removed folders.
        items_removed: u64,
    },
    /// The graph was replaced with a fresh listing from the remote store.
    Refreshed {
        /// Number of folders loaded.
        folder_count: usize,
    },
}

impl FolderEvent {
    /// The mutation state this event reports, if it is a lifecycle event.
    pub fn state(&self) -> Option<MutationState> {
        match self {
            Self::Pending { .. } => Some(MutationState::Pending),
            Self::Committed { .. } => Some(MutationState::Committed),
            Self::RolledBack { .. } => Some(MutationState::RolledBack),
            _ => None,
        }
    }
}
