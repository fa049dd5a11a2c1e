//! JSON snapshot of one owner's folders.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use foldertree_core::result::AppResult;
use foldertree_core::types::OwnerId;
use foldertree_entity::folder::Folder;

/// On-disk form of a folder store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Owner the folders belong to.
    #[serde(alias = "ownerId")]
    pub owner_id: OwnerId,
    /// Every folder, in no particular order.
    #[serde(default)]
    pub folders: Vec<Folder>,
}

impl Snapshot {
    /// An empty snapshot for `owner_id`.
    pub fn empty(owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            folders: Vec::new(),
        }
    }

    /// Read a snapshot from `path`. A missing file yields an empty snapshot
    /// for `owner_id`.
    pub async fn load(path: impl AsRef<Path>, owner_id: &OwnerId) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No snapshot yet, starting empty");
                return Ok(Self::empty(owner_id.clone()));
            }
            Err(err) => return Err(err.into()),
        };
        let snapshot: Self = serde_json::from_slice(&raw)?;
        debug!(
            path = %path.display(),
            folders = snapshot.folders.len(),
            "Snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Write the snapshot to `path`, creating parent directories.
    pub async fn save(&self, path: impl AsRef<Path>) -> AppResult<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        let raw = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(path, raw).await?;
        info!(path = %path.display(), folders = self.folders.len(), "Snapshot saved");
        Ok(())
    }
}
