//! Per-folder mutation locks.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use foldertree_core::types::FolderId;

/// Keyed lock table serializing mutations that touch the same folder.
///
/// Locks for a set of ids are always taken in sorted order, so two
/// mutations with overlapping id sets cannot deadlock.
#[derive(Debug, Clone, Default)]
pub struct FolderLocks {
    table: Arc<DashMap<FolderId, Arc<Mutex<()>>>>,
}

impl FolderLocks {
    /// An empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until every id in `ids` is free, then hold them all.
    pub async fn acquire(&self, ids: impl IntoIterator<Item = FolderId>) -> FolderLockGuard {
        let mut ids: Vec<FolderId> = ids.into_iter().collect();
        ids.sort();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in &ids {
            let mutex = self
                .table
                .entry(id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone();
            if mutex.try_lock().is_err() {
                debug!(folder_id = %id, "Waiting for in-flight mutation");
            }
            guards.push(mutex.lock_owned().await);
        }

        FolderLockGuard {
            ids,
            guards,
            table: Arc::clone(&self.table),
        }
    }

    /// Whether a mutation currently holds `id`.
    pub fn is_locked(&self, id: &FolderId) -> bool {
        self.table
            .get(id)
            .is_some_and(|mutex| mutex.try_lock().is_err())
    }

    /// Number of ids with a live lock entry.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether no lock entries are live.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Held locks; released on drop.
#[derive(Debug)]
pub struct FolderLockGuard {
    ids: Vec<FolderId>,
    guards: Vec<OwnedMutexGuard<()>>,
    table: Arc<DashMap<FolderId, Arc<Mutex<()>>>>,
}

impl FolderLockGuard {
    /// The held ids, sorted.
    pub fn ids(&self) -> &[FolderId] {
        &self.ids
    }
}

impl Drop for FolderLockGuard {
    fn drop(&mut self) {
        self.guards.clear();
        for id in &self.ids {
            self.table
                .remove_if(id, |_, mutex| Arc::strong_count(mutex) == 1);
        }
    }
}
