//! Move legality and folder name validation.

use std::collections::HashSet;

use thiserror::Error;

use foldertree_core::error::AppError;
use foldertree_core::types::FolderId;

use crate::ancestry::AncestryResolver;
use crate::graph::FolderGraph;

/// Why a reparent was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    /// The target parent is the folder itself.
    #[error("Cannot move a folder into itself")]
    SelfParent,
    /// The target parent lies inside the folder's own subtree.
    #[error("Cannot move a folder into its own subfolder")]
    CyclicMove,
}

impl From<MoveError> for AppError {
    fn from(err: MoveError) -> Self {
        AppError::cyclic_move(err.to_string())
    }
}

/// Side-effect-free move checks, safe to call while a drag is in progress.
#[derive(Debug, Clone, Copy)]
pub struct MoveValidator<'a> {
    ancestry: AncestryResolver<'a>,
}

impl<'a> MoveValidator<'a> {
    /// Creates a validator over `graph`.
    pub fn new(graph: &'a FolderGraph) -> Self {
        Self {
            ancestry: AncestryResolver::new(graph),
        }
    }

    /// Decide whether `folder_id` may become a child of `target_parent_id`
    /// (None = root level).
    pub fn can_move(
        &self,
        folder_id: &FolderId,
        target_parent_id: Option<&FolderId>,
    ) -> Result<(), MoveError> {
        let Some(target) = target_parent_id else {
            return Ok(());
        };
        if target == folder_id {
            return Err(MoveError::SelfParent);
        }
        if self.ancestry.is_self_or_descendant(folder_id, target) {
            return Err(MoveError::CyclicMove);
        }
        Ok(())
    }

    /// Folders that must be shown as disabled drop targets while
    /// `folder_id` is dragged: the folder and its subtree.
    pub fn disabled_targets(&self, folder_id: &FolderId) -> HashSet<FolderId> {
        let mut disabled = self.ancestry.descendants(folder_id);
        disabled.insert(folder_id.clone());
        disabled
    }
}

/// Trim and check a folder name. Returns the trimmed name.
pub fn validate_folder_name(name: &str, max_length: usize) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Folder name cannot be empty"));
    }
    if trimmed.chars().count() > max_length {
        return Err(AppError::validation(format!(
            "Folder name must be at most {max_length} characters"
        )));
    }
    Ok(trimmed.to_string())
}
