//! The remote folder store consumed by the engine.

use async_trait::async_trait;

use foldertree_core::result::AppResult;
use foldertree_core::types::{FolderId, OwnerId};
use foldertree_entity::folder::Folder;

/// Remote persistence for folders.
///
/// Every mutation call is fallible; the engine treats any error as "the
/// mutation failed" and rolls its optimistic change back. Writes are
/// last-write-wins, so callers serialize conflicting calls themselves.
#[async_trait]
pub trait RemoteFolderStore: Send + Sync + std::fmt::Debug + 'static {
    /// Every folder belonging to `owner_id`.
    async fn list_folders(&self, owner_id: &OwnerId) -> AppResult<Vec<Folder>>;

    /// Create a folder and return the stored record with its assigned id.
    async fn create_folder(&self, parent_id: Option<&FolderId>, name: &str) -> AppResult<Folder>;

    /// Rename a folder.
    async fn rename_folder(&self, id: &FolderId, name: &str) -> AppResult<()>;

    /// Reparent a folder (None = root level).
    async fn move_folder(&self, id: &FolderId, new_parent_id: Option<&FolderId>) -> AppResult<()>;

    /// Delete a folder together with its subtree and filed items.
    async fn delete_folder(&self, id: &FolderId) -> AppResult<()>;
}
