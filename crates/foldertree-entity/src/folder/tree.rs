//! Folder tree structures for hierarchical display.

use serde::{Deserialize, Serialize};

use foldertree_core::types::FolderId;

/// A node in a projected folder tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderNode {
    /// Folder ID.
    pub id: FolderId,
    /// Folder name.
    pub name: String,
    /// Depth level (0 for root-level nodes).
    pub depth: usize,
    /// Number of child nodes present in this projection.
    pub child_count: usize,
    /// Number of items filed in this folder.
    pub item_count: u64,
    /// Whether the node is expanded in the current view.
    pub expanded: bool,
    /// Whether the node matched the active search query.
    pub matched: bool,
    /// Whether the folder is awaiting remote creation.
    pub provisional: bool,
    /// Child folder nodes, sorted by name.
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    /// Visit this node and its descendants depth-first, in child order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a FolderNode)) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            visit(node);
            stack.extend(node.children.iter().rev());
        }
    }
}

/// One line of a rendered tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeRow {
    /// Folder ID.
    pub id: FolderId,
    /// Folder name.
    pub name: String,
    /// Indentation level.
    pub depth: usize,
    /// Whether the row has children in the projection.
    pub has_children: bool,
    /// Whether those children are shown.
    pub expanded: bool,
    /// Whether the row matched the search query.
    pub matched: bool,
    /// Item count.
    pub item_count: u64,
}

/// A projected folder tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderTree {
    /// The root node(s) of the tree.
    pub roots: Vec<FolderNode>,
    /// Total number of folders in the tree.
    pub total_folders: usize,
}

impl FolderTree {
    /// Whether the projection contains no folders.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Every folder id in the tree, in depth-first order.
    pub fn ids(&self) -> Vec<FolderId> {
        let mut ids = Vec::with_capacity(self.total_folders);
        for root in &self.roots {
            root.walk(&mut |node| ids.push(node.id.clone()));
        }
        ids
    }

    /// Look up a node by id.
    pub fn find(&self, id: &FolderId) -> Option<&FolderNode> {
        let mut found = None;
        for root in &self.roots {
            root.walk(&mut |node| {
                if found.is_none() && &node.id == id {
                    found = Some(node);
                }
            });
        }
        found
    }

    /// Flatten the tree into display rows, descending only into expanded
    /// nodes.
    pub fn visible_rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        let mut stack: Vec<&FolderNode> = self.roots.iter().rev().collect();
        while let Some(node) = stack.pop() {
            rows.push(TreeRow {
                id: node.id.clone(),
                name: node.name.clone(),
                depth: node.depth,
                has_children: !node.children.is_empty(),
                expanded: node.expanded,
                matched: node.matched,
                item_count: node.item_count,
            });
            if node.expanded {
                stack.extend(node.children.iter().rev());
            }
        }
        rows
    }
}

impl Drop for FolderTree {
    /// Unlinks nodes one level at a time so that dropping a deep tree does
    /// not recurse once per level.
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.roots);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}
