//! Client-local expansion state of a tree view.

use std::collections::HashSet;

use foldertree_core::types::FolderId;

use crate::ancestry::IntegrityError;
use crate::graph::FolderGraph;

/// Which folders are expanded in the current view, and which folder the
/// view is focused on. Never persisted remotely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<FolderId>,
    selection: Option<FolderId>,
}

impl ExpansionState {
    /// All folders collapsed, nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial state for a view, revealing `selected` when one is given
    /// (for example from a URL parameter).
    pub fn for_selection(
        graph: &FolderGraph,
        selected: Option<&FolderId>,
    ) -> Result<Self, IntegrityError> {
        let mut state = Self::new();
        if let Some(selected) = selected {
            state.expand_path(graph, selected)?;
            state.selection = Some(selected.clone());
        }
        Ok(state)
    }

    /// The folder the view is focused on.
    pub fn selection(&self) -> Option<&FolderId> {
        self.selection.as_ref()
    }

    /// Change the focused folder. The state is reset and re-derived when the
    /// selection changes; returns whether it did.
    pub fn set_selection(
        &mut self,
        graph: &FolderGraph,
        selected: Option<&FolderId>,
    ) -> Result<bool, IntegrityError> {
        if self.selection.as_ref() == selected {
            return Ok(false);
        }
        *self = Self::for_selection(graph, selected)?;
        Ok(true)
    }

    /// Whether `id` is expanded.
    pub fn is_expanded(&self, id: &FolderId) -> bool {
        self.expanded.contains(id)
    }

    /// The expanded ids.
    pub fn expanded(&self) -> &HashSet<FolderId> {
        &self.expanded
    }

    /// Number of expanded folders.
    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    /// Whether nothing is expanded.
    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    /// Flip `id`, returning its new state.
    pub fn toggle(&mut self, id: &FolderId) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.clone());
            true
        }
    }

    /// Expand `id`.
    pub fn expand(&mut self, id: &FolderId) {
        self.expanded.insert(id.clone());
    }

    /// Collapse `id`.
    pub fn collapse(&mut self, id: &FolderId) {
        self.expanded.remove(id);
    }

    /// Collapse everything, keeping the selection.
    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Expand every folder in the graph.
    pub fn expand_all(&mut self, graph: &FolderGraph) {
        self.expanded
            .extend(graph.all().into_iter().map(|folder| folder.id.clone()));
    }

    /// Expand `id` and every ancestor so that it is visible. Idempotent.
    /// Unknown ids are ignored.
    pub fn expand_path(&mut self, graph: &FolderGraph, id: &FolderId) -> Result<(), IntegrityError> {
        if !graph.contains(id) {
            return Ok(());
        }
        let chain = graph.ancestry().ancestor_chain(id)?;
        self.expanded.extend(chain);
        self.expanded.insert(id.clone());
        Ok(())
    }

    /// Expand the ancestors of every folder matching `query` so each match
    /// is visible. Returns the number of matches revealed.
    pub fn reveal_matches(&mut self, graph: &FolderGraph, query: &str) -> usize {
        let ancestry = graph.ancestry();
        let mut revealed = 0;
        for matched in graph.projector().matches(query) {
            if let Ok(chain) = ancestry.ancestor_chain(&matched) {
                self.expanded.extend(chain);
                revealed += 1;
            }
        }
        revealed
    }

    /// Forget folders that no longer exist.
    pub fn retain_existing(&mut self, graph: &FolderGraph) {
        self.expanded.retain(|id| graph.contains(id));
        if self.selection.as_ref().is_some_and(|id| !graph.contains(id)) {
            self.selection = None;
        }
    }

    /// Carry state from a provisional id to its server-assigned id.
    pub fn remap(&mut self, from: &FolderId, to: &FolderId) {
        if self.expanded.remove(from) {
            self.expanded.insert(to.clone());
        }
        if self.selection.as_ref() == Some(from) {
            self.selection = Some(to.clone());
        }
    }
}
