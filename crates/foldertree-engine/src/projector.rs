//! Tree projections for rendering.
//!
//! A projection decides which folders are visible (everything, search
//! matches plus their ancestors, or one folder's scope) and shapes them
//! into a [`FolderTree`] with children sorted by name.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use foldertree_core::error::AppError;
use foldertree_core::types::FolderId;
use foldertree_entity::folder::{Folder, FolderNode, FolderTree};

use crate::expansion::ExpansionState;
use crate::graph::FolderGraph;

/// Which subset of the tree to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum ProjectionMode {
    /// Every folder.
    Full,
    /// Folders whose name contains the query, plus their ancestors.
    Search(String),
    /// The selected folder with its ancestors, descendants, and siblings.
    Scoped(FolderId),
}

/// Pure projections over a [`FolderGraph`].
#[derive(Debug, Clone, Copy)]
pub struct ViewProjector<'a> {
    graph: &'a FolderGraph,
}

impl<'a> ViewProjector<'a> {
    /// Creates a projector over `graph`.
    pub fn new(graph: &'a FolderGraph) -> Self {
        Self { graph }
    }

    /// Folders whose name contains `query`, case-insensitively. A blank
    /// query matches nothing.
    pub fn matches(&self, query: &str) -> Vec<FolderId> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.graph
            .all()
            .into_iter()
            .filter(|folder| folder.name.to_lowercase().contains(&needle))
            .map(|folder| folder.id.clone())
            .collect()
    }

    /// The set of visible folder ids, or `None` when every folder is
    /// visible.
    pub fn visible_set(&self, mode: &ProjectionMode) -> Result<Option<HashSet<FolderId>>, AppError> {
        match mode {
            ProjectionMode::Full => Ok(None),
            ProjectionMode::Search(query) if query.trim().is_empty() => Ok(None),
            ProjectionMode::Search(query) => Ok(Some(self.search_set(query))),
            ProjectionMode::Scoped(selected) => self.scoped_set(selected).map(Some),
        }
    }

    /// Project the graph into a tree. `expansion` marks expanded nodes; all
    /// nodes are collapsed without it.
    pub fn project(
        &self,
        mode: &ProjectionMode,
        expansion: Option<&ExpansionState>,
    ) -> Result<FolderTree, AppError> {
        let visible = self.visible_set(mode)?;
        let matched: HashSet<FolderId> = match mode {
            ProjectionMode::Search(query) => self.matches(query).into_iter().collect(),
            _ => HashSet::new(),
        };

        let builder = TreeBuilder {
            graph: self.graph,
            visible: visible.as_ref(),
            matched: &matched,
            expansion,
        };
        let (roots, total_folders) = builder.build();

        Ok(FolderTree {
            roots,
            total_folders,
        })
    }

    fn search_set(&self, query: &str) -> HashSet<FolderId> {
        let ancestry = self.graph.ancestry();
        let mut visible = HashSet::new();
        for matched in self.matches(query) {
            match ancestry.ancestor_chain(&matched) {
                Ok(chain) => visible.extend(chain),
                Err(err) => {
                    warn!(folder_id = %matched, error = %err, "Search match has no path to the root");
                    continue;
                }
            }
            visible.insert(matched);
        }
        visible
    }

    fn scoped_set(&self, selected: &FolderId) -> Result<HashSet<FolderId>, AppError> {
        if !self.graph.contains(selected) {
            return Err(AppError::not_found(format!("Folder {selected} not found")));
        }
        let ancestry = self.graph.ancestry();
        let mut visible: HashSet<FolderId> = ancestry.ancestor_chain(selected)?.into_iter().collect();
        visible.extend(ancestry.descendants(selected));
        visible.extend(ancestry.siblings(selected));
        visible.insert(selected.clone());
        Ok(visible)
    }
}

struct TreeBuilder<'a> {
    graph: &'a FolderGraph,
    visible: Option<&'a HashSet<FolderId>>,
    matched: &'a HashSet<FolderId>,
    expansion: Option<&'a ExpansionState>,
}

/// A folder chosen for the tree, in depth-first order.
struct Placement<'a> {
    folder: &'a Folder,
    depth: usize,
    /// Index of the parent placement; None at root level.
    parent: Option<usize>,
}

impl TreeBuilder<'_> {
    /// Returns the root nodes and the number of folders placed.
    ///
    /// Both passes use explicit stacks so deep trees never exhaust the
    /// call stack. A folder is never placed twice.
    fn build(&self) -> (Vec<FolderNode>, usize) {
        let mut placed: HashSet<&FolderId> = HashSet::new();
        let mut order: Vec<Placement<'_>> = Vec::new();
        let mut stack: Vec<(&Folder, usize, Option<usize>)> = self
            .graph
            .children(None)
            .into_iter()
            .rev()
            .map(|folder| (folder, 0, None))
            .collect();

        while let Some((folder, depth, parent)) = stack.pop() {
            if self.visible.is_some_and(|visible| !visible.contains(&folder.id)) {
                continue;
            }
            if !placed.insert(&folder.id) {
                continue;
            }
            let index = order.len();
            order.push(Placement {
                folder,
                depth,
                parent,
            });
            stack.extend(
                self.graph
                    .children(Some(&folder.id))
                    .into_iter()
                    .rev()
                    .map(|child| (child, depth + 1, Some(index))),
            );
        }

        // Children always come after their parent, so assembling in reverse
        // finishes every subtree before its parent needs it.
        let total = order.len();
        let mut children: Vec<Vec<FolderNode>> = (0..total).map(|_| Vec::new()).collect();
        let mut roots = Vec::new();
        for (index, placement) in order.iter().enumerate().rev() {
            let mut kids = std::mem::take(&mut children[index]);
            kids.reverse();
            let folder = placement.folder;
            let node = FolderNode {
                id: folder.id.clone(),
                name: folder.name.clone(),
                depth: placement.depth,
                child_count: kids.len(),
                item_count: folder.item_count,
                expanded: self
                    .expansion
                    .is_some_and(|expansion| expansion.is_expanded(&folder.id)),
                matched: self.matched.contains(&folder.id),
                provisional: folder.is_provisional(),
                children: kids,
            };
            match placement.parent {
                Some(parent) => children[parent].push(node),
                None => roots.push(node),
            }
        }
        roots.reverse();
        (roots, total)
    }
}
