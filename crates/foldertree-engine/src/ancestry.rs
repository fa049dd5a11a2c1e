//! Cycle-safe ancestry queries over a [`FolderGraph`].
//!
//! Every projection and the move validator walk parent/child links
//! through this module, so there is exactly one bounded traversal.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{error, warn};

use foldertree_core::error::AppError;
use foldertree_core::types::FolderId;

use crate::graph::FolderGraph;

/// The folder graph violates its acyclic or referential invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    /// The folder is a member of a parent cycle.
    #[error("Folder {folder_id} is its own ancestor")]
    Cycle {
        /// Folder whose ancestry walk came back to itself.
        folder_id: FolderId,
    },
    /// The folder is outside a cycle but its ancestry leads into one.
    #[error("Ancestry of folder {folder_id} reaches a cycle at {at}")]
    ReachesCycle {
        /// Folder whose ancestry walk was aborted.
        folder_id: FolderId,
        /// First cycle member the walk revisited.
        at: FolderId,
    },
    /// The folder references a parent that does not exist.
    #[error("Folder {folder_id} references missing parent {parent_id}")]
    DanglingParent {
        /// The folder holding the reference.
        folder_id: FolderId,
        /// The missing parent.
        parent_id: FolderId,
    },
}

impl From<IntegrityError> for AppError {
    fn from(err: IntegrityError) -> Self {
        AppError::integrity(err.to_string())
    }
}

/// Read-only ancestry queries.
#[derive(Debug, Clone, Copy)]
pub struct AncestryResolver<'a> {
    graph: &'a FolderGraph,
}

impl<'a> AncestryResolver<'a> {
    /// Creates a resolver over `graph`.
    pub fn new(graph: &'a FolderGraph) -> Self {
        Self { graph }
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    ///
    /// The walk is bounded by the graph size. A revisited folder aborts the
    /// walk with [`IntegrityError::Cycle`] when `id` itself is on the cycle,
    /// or [`IntegrityError::ReachesCycle`] otherwise. A missing parent ends
    /// the chain.
    /// Unknown ids have no ancestors.
    pub fn ancestor_chain(&self, id: &FolderId) -> Result<Vec<FolderId>, IntegrityError> {
        let mut chain = Vec::new();
        let Some(mut current) = self.graph.get(id) else {
            return Ok(chain);
        };

        let limit = self.graph.len();
        let mut seen: HashSet<&FolderId> = HashSet::from([id]);

        while let Some(parent_id) = current.parent_id.as_ref() {
            if !seen.insert(parent_id) || chain.len() >= limit {
                error!(folder_id = %id, at = %parent_id, "Parent cycle detected, aborting ancestry walk");
                return Err(if parent_id == id {
                    IntegrityError::Cycle {
                        folder_id: id.clone(),
                    }
                } else {
                    IntegrityError::ReachesCycle {
                        folder_id: id.clone(),
                        at: parent_id.clone(),
                    }
                });
            }
            match self.graph.get(parent_id) {
                Some(parent) => {
                    chain.push(parent_id.clone());
                    current = parent;
                }
                None => {
                    warn!(folder_id = %current.id, parent_id = %parent_id, "Dangling parent reference");
                    break;
                }
            }
        }

        Ok(chain)
    }

    /// Every folder reachable downward from `id`, excluding `id`.
    pub fn descendants(&self, id: &FolderId) -> HashSet<FolderId> {
        let mut found = HashSet::new();
        let mut stack: Vec<&FolderId> = self.graph.child_ids(Some(id)).iter().collect();

        while let Some(current) = stack.pop() {
            if current == id || !found.insert(current.clone()) {
                continue;
            }
            stack.extend(self.graph.child_ids(Some(current)));
        }

        found
    }

    /// True iff `subject_id` is `candidate_ancestor_id` or lies in its
    /// subtree.
    pub fn is_self_or_descendant(
        &self,
        candidate_ancestor_id: &FolderId,
        subject_id: &FolderId,
    ) -> bool {
        subject_id == candidate_ancestor_id
            || self.descendants(candidate_ancestor_id).contains(subject_id)
    }

    /// Folders with the same `parent_id` as `id`, excluding `id`, ordered
    /// by name. Folders under a missing parent are siblings of each other
    /// only, not of the root level they render at.
    pub fn siblings(&self, id: &FolderId) -> Vec<FolderId> {
        let Some(folder) = self.graph.get(id) else {
            return Vec::new();
        };
        self.graph
            .all()
            .into_iter()
            .filter(|other| &other.id != id && other.parent_id == folder.parent_id)
            .map(|other| other.id.clone())
            .collect()
    }
}
