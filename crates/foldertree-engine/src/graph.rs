//! The canonical in-memory folder graph.
//!
//! `FolderGraph` owns every folder record and a parent→children index
//! that is rebuilt after each mutation. Mutators are crate-private: only
//! the [`MutationCoordinator`](crate::MutationCoordinator) changes records,
//! everything else reads.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::warn;

use foldertree_core::types::FolderId;
use foldertree_entity::folder::Folder;

use crate::ancestry::{AncestryResolver, IntegrityError};
use crate::projector::ViewProjector;
use crate::validator::MoveValidator;

/// Mapping from folder id to record, with a derived children index.
///
/// Folders whose `parent_id` references a missing folder are indexed at
/// root level so they stay reachable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderGraph {
    /// Folder records keyed by id.
    folders: HashMap<FolderId, Folder>,
    /// Parent id (None = root level) → child ids sorted by name.
    children: HashMap<Option<FolderId>, Vec<FolderId>>,
}

/// Result of scanning a graph for invariant violations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    /// Folders whose parent does not exist.
    pub dangling: Vec<(FolderId, FolderId)>,
    /// Folders that are their own ancestor.
    pub cyclic: Vec<FolderId>,
    /// Folders outside any cycle whose ancestry leads into one, with the
    /// cycle member reached.
    pub cycle_tails: Vec<(FolderId, FolderId)>,
}

impl IntegrityReport {
    /// Whether the graph satisfies every invariant.
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty() && self.cyclic.is_empty() && self.cycle_tails.is_empty()
    }

    /// The violations as errors.
    pub fn issues(&self) -> Vec<IntegrityError> {
        let dangling = self
            .dangling
            .iter()
            .map(|(folder_id, parent_id)| IntegrityError::DanglingParent {
                folder_id: folder_id.clone(),
                parent_id: parent_id.clone(),
            });
        let cyclic = self.cyclic.iter().map(|folder_id| IntegrityError::Cycle {
            folder_id: folder_id.clone(),
        });
        let tails = self
            .cycle_tails
            .iter()
            .map(|(folder_id, at)| IntegrityError::ReachesCycle {
                folder_id: folder_id.clone(),
                at: at.clone(),
            });
        dangling.chain(cyclic).chain(tails).collect()
    }
}

impl FolderGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a fetched listing. A repeated id keeps the last
    /// record.
    pub fn from_folders(folders: impl IntoIterator<Item = Folder>) -> Self {
        let mut graph = Self::new();
        graph.load(folders);
        graph
    }

    /// Number of folders.
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Whether the graph has no folders.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Whether a folder with this id exists.
    pub fn contains(&self, id: &FolderId) -> bool {
        self.folders.contains_key(id)
    }

    /// Look up a folder.
    pub fn get(&self, id: &FolderId) -> Option<&Folder> {
        self.folders.get(id)
    }

    /// Every folder, ordered by name.
    pub fn all(&self) -> Vec<&Folder> {
        let mut all: Vec<&Folder> = self.folders.values().collect();
        all.sort_by(|a, b| a.cmp_by_name(b));
        all
    }

    /// Children of `parent_id` (None = root level), ordered by name.
    pub fn children(&self, parent_id: Option<&FolderId>) -> Vec<&Folder> {
        self.child_ids(parent_id)
            .iter()
            .filter_map(|id| self.folders.get(id))
            .collect()
    }

    /// Ids of the children of `parent_id`, ordered by name.
    pub fn child_ids(&self, parent_id: Option<&FolderId>) -> &[FolderId] {
        self.children
            .get(&parent_id.cloned())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The index bucket a folder lives in: its parent, or root level when
    /// the parent is null or missing.
    pub fn effective_parent(&self, id: &FolderId) -> Option<&FolderId> {
        self.folders
            .get(id)
            .and_then(|f| f.parent_id.as_ref())
            .filter(|parent| self.folders.contains_key(*parent))
    }

    /// Whether the folder's parent reference points at a missing folder.
    pub fn has_dangling_parent(&self, id: &FolderId) -> bool {
        self.folders
            .get(id)
            .and_then(|f| f.parent_id.as_ref())
            .is_some_and(|parent| !self.folders.contains_key(parent))
    }

    /// Ancestry queries over this graph.
    pub fn ancestry(&self) -> AncestryResolver<'_> {
        AncestryResolver::new(self)
    }

    /// Move validation over this graph.
    pub fn validator(&self) -> MoveValidator<'_> {
        MoveValidator::new(self)
    }

    /// View projections over this graph.
    pub fn projector(&self) -> ViewProjector<'_> {
        ViewProjector::new(self)
    }

    /// Scan for dangling parents and parent cycles.
    pub fn integrity_report(&self) -> IntegrityReport {
        let ancestry = self.ancestry();
        let mut report = IntegrityReport::default();
        for folder in self.all() {
            if let Some(parent) = &folder.parent_id {
                if !self.folders.contains_key(parent) {
                    report.dangling.push((folder.id.clone(), parent.clone()));
                }
            }
            match ancestry.ancestor_chain(&folder.id) {
                Err(IntegrityError::Cycle { folder_id }) => report.cyclic.push(folder_id),
                Err(IntegrityError::ReachesCycle { folder_id, at }) => {
                    report.cycle_tails.push((folder_id, at));
                }
                Err(IntegrityError::DanglingParent { .. }) | Ok(_) => {}
            }
        }
        report
    }

    /// Replace every record.
    pub(crate) fn load(&mut self, folders: impl IntoIterator<Item = Folder>) {
        self.folders.clear();
        for folder in folders {
            if let Some(previous) = self.folders.insert(folder.id.clone(), folder) {
                warn!(folder_id = %previous.id, "Duplicate folder id in listing, keeping last");
            }
        }
        self.reindex();
    }

    /// Insert or overwrite a record, returning the previous one.
    pub(crate) fn insert(&mut self, folder: Folder) -> Option<Folder> {
        let previous = self.folders.insert(folder.id.clone(), folder);
        self.reindex();
        previous
    }

    /// Remove a single record.
    pub(crate) fn remove(&mut self, id: &FolderId) -> Option<Folder> {
        let removed = self.folders.remove(id);
        if removed.is_some() {
            self.reindex();
        }
        removed
    }

    /// Remove a folder and its descendants, returning them root first.
    pub(crate) fn remove_subtree(&mut self, id: &FolderId) -> Vec<Folder> {
        if !self.folders.contains_key(id) {
            return Vec::new();
        }
        let mut order = vec![id.clone()];
        let mut seen: HashSet<FolderId> = HashSet::from([id.clone()]);
        let mut cursor = 0;
        while cursor < order.len() {
            let current = order[cursor].clone();
            for child in self.child_ids(Some(&current)) {
                if seen.insert(child.clone()) {
                    order.push(child.clone());
                }
            }
            cursor += 1;
        }
        let removed = order
            .iter()
            .filter_map(|folder_id| self.folders.remove(folder_id))
            .collect();
        self.reindex();
        removed
    }

    /// Reinsert previously removed records.
    pub(crate) fn restore(&mut self, folders: Vec<Folder>) {
        for folder in folders {
            self.folders.insert(folder.id.clone(), folder);
        }
        self.reindex();
    }

    /// Overwrite a name, returning the previous one.
    pub(crate) fn set_name(&mut self, id: &FolderId, name: String) -> Option<String> {
        let folder = self.folders.get_mut(id)?;
        let previous = std::mem::replace(&mut folder.name, name);
        self.reindex();
        Some(previous)
    }

    /// Overwrite a parent reference, returning the previous one.
    pub(crate) fn set_parent(
        &mut self,
        id: &FolderId,
        parent_id: Option<FolderId>,
    ) -> Option<Option<FolderId>> {
        let folder = self.folders.get_mut(id)?;
        let previous = std::mem::replace(&mut folder.parent_id, parent_id);
        self.reindex();
        Some(previous)
    }

    /// Replace a provisional record with the one the remote store returned.
    pub(crate) fn swap_id(&mut self, provisional_id: &FolderId, folder: Folder) {
        self.folders.remove(provisional_id);
        self.folders.insert(folder.id.clone(), folder);
        self.reindex();
    }

    fn reindex(&mut self) {
        let mut children: HashMap<Option<FolderId>, Vec<FolderId>> = HashMap::new();
        for folder in self.folders.values() {
            let bucket = folder
                .parent_id
                .clone()
                .filter(|parent| self.folders.contains_key(parent));
            children.entry(bucket).or_default().push(folder.id.clone());
        }
        for ids in children.values_mut() {
            ids.sort_by(|a, b| self.folders[a].cmp_by_name(&self.folders[b]));
        }
        self.children = children;
    }
}
