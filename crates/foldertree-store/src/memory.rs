//! In-memory folder store using dashmap.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use foldertree_core::config::store::StoreConfig;
use foldertree_core::error::AppError;
use foldertree_core::result::AppResult;
use foldertree_core::types::{FolderId, OwnerId};
use foldertree_engine::store::RemoteFolderStore;
use foldertree_entity::folder::Folder;

use crate::fault::{FaultPlan, StoreOperation};
use crate::snapshot::Snapshot;

/// Folder store for a single owner, held in process memory.
///
/// Behaves like the remote backend the engine talks to: ids are assigned
/// on create, deletes cascade to the whole subtree, and unknown ids are
/// `NotFound`. Clones share the same state.
#[derive(Debug, Clone)]
pub struct MemoryFolderStore {
    /// Owner every stored folder belongs to.
    owner_id: OwnerId,
    /// Folder records keyed by id.
    folders: Arc<DashMap<FolderId, Folder>>,
    /// Calls received per operation.
    calls: Arc<DashMap<StoreOperation, usize>>,
    /// Armed failures.
    faults: FaultPlan,
    /// Delay in milliseconds applied before answering each call.
    latency_ms: Arc<AtomicU64>,
}

impl MemoryFolderStore {
    /// An empty store for `owner_id`.
    pub fn new(owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            folders: Arc::new(DashMap::new()),
            calls: Arc::new(DashMap::new()),
            faults: FaultPlan::default(),
            latency_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    /// An empty store configured from the `store` section.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(OwnerId::from(config.owner_id.as_str()))
            .with_latency(Duration::from_millis(config.latency_ms))
    }

    /// A store holding the folders of `snapshot`.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let store = Self::new(snapshot.owner_id);
        store.load(snapshot.folders);
        store
    }

    /// Delay every call by `latency`.
    pub fn with_latency(self, latency: Duration) -> Self {
        self.set_latency(latency);
        self
    }

    /// Change the delay applied to calls from now on.
    pub fn set_latency(&self, latency: Duration) {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.latency_ms.store(millis, Ordering::Relaxed);
    }

    /// The owner this store serves.
    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    /// Replace the stored folders.
    pub fn load(&self, folders: impl IntoIterator<Item = Folder>) {
        self.folders.clear();
        for folder in folders {
            self.folders.insert(folder.id.clone(), folder);
        }
    }

    /// Current contents, sorted by id.
    pub fn snapshot(&self) -> Snapshot {
        let mut folders: Vec<Folder> = self.folders.iter().map(|entry| entry.value().clone()).collect();
        folders.sort_by(|a, b| a.id.cmp(&b.id));
        Snapshot {
            owner_id: self.owner_id.clone(),
            folders,
        }
    }

    /// A stored folder.
    pub fn get(&self, id: &FolderId) -> Option<Folder> {
        self.folders.get(id).map(|entry| entry.value().clone())
    }

    /// Number of stored folders.
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Whether the store holds no folders.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Fail the next call of `op` with `message`.
    pub fn fail_next(&self, op: StoreOperation, message: impl Into<String>) {
        self.faults.arm(op, message.into(), false);
    }

    /// Fail every call of `op` with `message` until [`Self::recover`].
    pub fn set_failing(&self, op: StoreOperation, message: impl Into<String>) {
        self.faults.arm(op, message.into(), true);
    }

    /// Stop failing `op`.
    pub fn recover(&self, op: StoreOperation) {
        self.faults.disarm(op);
    }

    /// Stop failing every operation.
    pub fn recover_all(&self) {
        self.faults.clear();
    }

    /// Calls received for `op`, including failed ones.
    pub fn call_count(&self, op: StoreOperation) -> usize {
        self.calls.get(&op).map(|count| *count).unwrap_or(0)
    }

    /// Calls received across all operations.
    pub fn total_calls(&self) -> usize {
        self.calls.iter().map(|entry| *entry.value()).sum()
    }

    /// Count the call, wait out the latency, and trip any armed fault.
    async fn enter(&self, op: StoreOperation) -> AppResult<()> {
        *self.calls.entry(op).or_insert(0) += 1;
        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if let Some(err) = self.faults.trip(op) {
            debug!(operation = %op, error = %err, "Injected store failure");
            return Err(err);
        }
        Ok(())
    }

    fn require(&self, id: &FolderId) -> AppResult<()> {
        if self.folders.contains_key(id) {
            Ok(())
        } else {
            Err(AppError::not_found(format!("Folder {id} not found")))
        }
    }

    /// `id` and every stored folder below it.
    fn subtree(&self, id: &FolderId) -> HashSet<FolderId> {
        let mut subtree = HashSet::from([id.clone()]);
        loop {
            let found: Vec<FolderId> = self
                .folders
                .iter()
                .filter(|entry| {
                    entry
                        .parent_id
                        .as_ref()
                        .is_some_and(|parent| subtree.contains(parent))
                        && !subtree.contains(entry.key())
                })
                .map(|entry| entry.key().clone())
                .collect();
            if found.is_empty() {
                return subtree;
            }
            subtree.extend(found);
        }
    }
}

#[async_trait]
impl RemoteFolderStore for MemoryFolderStore {
    async fn list_folders(&self, owner_id: &OwnerId) -> AppResult<Vec<Folder>> {
        self.enter(StoreOperation::List).await?;
        if owner_id != &self.owner_id {
            return Ok(Vec::new());
        }
        Ok(self.snapshot().folders)
    }

    async fn create_folder(&self, parent_id: Option<&FolderId>, name: &str) -> AppResult<Folder> {
        self.enter(StoreOperation::Create).await?;
        if let Some(parent) = parent_id {
            self.require(parent)?;
        }
        let folder = Folder::new(FolderId::new(), name, parent_id.cloned());
        self.folders.insert(folder.id.clone(), folder.clone());
        debug!(folder_id = %folder.id, "Stored new folder");
        Ok(folder)
    }

    async fn rename_folder(&self, id: &FolderId, name: &str) -> AppResult<()> {
        self.enter(StoreOperation::Rename).await?;
        let mut folder = self
            .folders
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;
        folder.name = name.to_string();
        Ok(())
    }

    async fn move_folder(&self, id: &FolderId, new_parent_id: Option<&FolderId>) -> AppResult<()> {
        self.enter(StoreOperation::Move).await?;
        self.require(id)?;
        if let Some(parent) = new_parent_id {
            self.require(parent)?;
            if self.subtree(id).contains(parent) {
                return Err(AppError::cyclic_move(
                    "Cannot move a folder into its own subfolder",
                ));
            }
        }
        if let Some(mut folder) = self.folders.get_mut(id) {
            folder.parent_id = new_parent_id.cloned();
        }
        Ok(())
    }

    async fn delete_folder(&self, id: &FolderId) -> AppResult<()> {
        self.enter(StoreOperation::Delete).await?;
        self.require(id)?;
        let subtree = self.subtree(id);
        for folder_id in &subtree {
            self.folders.remove(folder_id);
        }
        debug!(folder_id = %id, removed = subtree.len(), "Deleted folder subtree");
        Ok(())
    }
}
