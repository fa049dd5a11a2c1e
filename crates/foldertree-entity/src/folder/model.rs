//! Folder entity model.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use foldertree_core::types::FolderId;

/// A folder in the bookmark hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// Display name.
    pub name: String,
    /// Parent folder ID (None for root folders).
    #[serde(default, alias = "parentId")]
    pub parent_id: Option<FolderId>,
    /// Number of items filed in the folder. Denormalized, display only.
    #[serde(default, alias = "itemCount")]
    pub item_count: u64,
}

impl Folder {
    /// Create a folder record.
    pub fn new(id: impl Into<FolderId>, name: impl Into<String>, parent_id: Option<FolderId>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id,
            item_count: 0,
        }
    }

    /// Set the item count.
    pub fn with_item_count(mut self, item_count: u64) -> Self {
        self.item_count = item_count;
        self
    }

    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether the folder only exists locally, awaiting remote creation.
    pub fn is_provisional(&self) -> bool {
        self.id.is_provisional()
    }

    /// Sibling ordering: case-insensitive by name, then exact name, then id
    /// so that equal names still order deterministically.
    pub fn cmp_by_name(&self, other: &Self) -> Ordering {
        self.name
            .to_lowercase()
            .cmp(&other.name.to_lowercase())
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.id.cmp(&other.id))
    }
}
