//! Inverse operations captured before an optimistic change.

use tracing::warn;

use foldertree_core::types::FolderId;
use foldertree_entity::folder::Folder;

use crate::graph::FolderGraph;

/// Everything needed to put the graph back the way it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Undo {
    /// Drop a provisional folder inserted by a create.
    RemoveProvisional(FolderId),
    /// Put back the name a rename overwrote.
    RestoreName {
        folder_id: FolderId,
        previous: String,
    },
    /// Put back the parent a move overwrote.
    RestoreParent {
        folder_id: FolderId,
        previous: Option<FolderId>,
    },
    /// Reinsert a deleted subtree.
    RestoreSubtree(Vec<Folder>),
}

impl Undo {
    /// Apply the inverse operation. Records that have since disappeared
    /// (a refresh replaced the graph) are skipped.
    pub(crate) fn apply(self, graph: &mut FolderGraph) {
        match self {
            Self::RemoveProvisional(folder_id) => {
                if graph.remove(&folder_id).is_none() {
                    warn!(folder_id = %folder_id, "Provisional folder already gone during rollback");
                }
            }
            Self::RestoreName { folder_id, previous } => {
                if graph.set_name(&folder_id, previous).is_none() {
                    warn!(folder_id = %folder_id, "Folder missing during rename rollback");
                }
            }
            Self::RestoreParent { folder_id, previous } => {
                if graph.set_parent(&folder_id, previous).is_none() {
                    warn!(folder_id = %folder_id, "Folder missing during move rollback");
                }
            }
            Self::RestoreSubtree(folders) => graph.restore(folders),
        }
    }
}
