//! Optimistic folder mutations with rollback.
//!
//! Each mutation validates locally, applies its change to the graph,
//! dispatches the remote call, and then either commits or applies the
//! [`Undo`] captured before the change. The graph lock is never held
//! across a remote call; the per-folder lock table is.

pub mod locks;
mod undo;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, RwLockReadGuard, broadcast};
use tracing::{debug, info, warn};

use foldertree_core::config::engine::EngineConfig;
use foldertree_core::error::{AppError, ErrorKind};
use foldertree_core::events::{EngineEvent, FolderEvent};
use foldertree_core::result::AppResult;
use foldertree_core::types::{FolderId, MutationId, MutationKind, MutationState, OwnerId};
use foldertree_entity::folder::{Folder, FolderTree};

use crate::drag::DropOutcome;
use crate::expansion::ExpansionState;
use crate::graph::FolderGraph;
use crate::notifier::EventNotifier;
use crate::projector::ProjectionMode;
use crate::store::RemoteFolderStore;
use crate::validator::{MoveError, validate_folder_name};

pub use self::locks::{FolderLockGuard, FolderLocks};
use self::undo::Undo;

/// Outcome of a mutation that was not rolled back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRecord {
    /// The mutation attempt.
    pub mutation_id: MutationId,
    /// What kind of mutation.
    pub kind: MutationKind,
    /// The affected folder (server id for creates).
    pub folder_id: FolderId,
    /// Final state.
    pub state: MutationState,
    /// Whether a remote call was made. False for no-op changes.
    pub remote_dispatched: bool,
}

/// In-flight bookkeeping for one mutation.
#[derive(Debug)]
struct Mutation {
    id: MutationId,
    kind: MutationKind,
    folder_id: FolderId,
    state: MutationState,
    remote_dispatched: bool,
}

impl Mutation {
    fn begin(kind: MutationKind, folder_id: FolderId) -> Self {
        Self {
            id: MutationId::new(),
            kind,
            folder_id,
            state: MutationState::Pending,
            remote_dispatched: false,
        }
    }

    /// A change that turned out to be a no-op commits without a remote call.
    fn unchanged(kind: MutationKind, folder_id: FolderId) -> MutationRecord {
        let mut mutation = Self::begin(kind, folder_id);
        mutation.state = MutationState::Committed;
        mutation.record()
    }

    fn record(&self) -> MutationRecord {
        MutationRecord {
            mutation_id: self.id,
            kind: self.kind,
            folder_id: self.folder_id.clone(),
            state: self.state,
            remote_dispatched: self.remote_dispatched,
        }
    }
}

/// Sole writer of the folder graph.
///
/// Mutations on the same folder are serialized through [`FolderLocks`].
/// Structural mutations (move, delete, refresh) also hold the structure
/// lock exclusively and creates hold it shared, so no rollback can
/// reintroduce a cycle or restore a subtree under a vanished parent.
#[derive(Debug)]
pub struct MutationCoordinator {
    /// The canonical graph.
    graph: RwLock<FolderGraph>,
    /// Remote persistence.
    store: Arc<dyn RemoteFolderStore>,
    /// Per-folder mutation queue.
    locks: FolderLocks,
    /// Guards parent/child structure across in-flight mutations.
    structure: RwLock<()>,
    /// Event fan-out.
    notifier: EventNotifier,
    /// Engine limits.
    config: EngineConfig,
}

impl MutationCoordinator {
    /// Creates a coordinator with an empty graph.
    pub fn new(store: Arc<dyn RemoteFolderStore>, config: EngineConfig) -> Self {
        Self {
            graph: RwLock::new(FolderGraph::new()),
            store,
            locks: FolderLocks::new(),
            structure: RwLock::new(()),
            notifier: EventNotifier::new(config.event_buffer),
            config,
        }
    }

    /// Subscribe to mutation events and notices.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.notifier.subscribe()
    }

    /// Read access to the graph. Do not hold across a mutation call.
    pub async fn graph(&self) -> RwLockReadGuard<'_, FolderGraph> {
        self.graph.read().await
    }

    /// A copy of the current graph.
    pub async fn snapshot(&self) -> FolderGraph {
        self.graph.read().await.clone()
    }

    /// The per-folder lock table.
    pub fn locks(&self) -> &FolderLocks {
        &self.locks
    }

    /// Project the current graph.
    pub async fn project(
        &self,
        mode: &ProjectionMode,
        expansion: Option<&ExpansionState>,
    ) -> AppResult<FolderTree> {
        self.graph.read().await.projector().project(mode, expansion)
    }

    /// Speculative move check against the current graph.
    pub async fn can_move(
        &self,
        folder_id: &FolderId,
        target_parent_id: Option<&FolderId>,
    ) -> Result<(), MoveError> {
        self.graph
            .read()
            .await
            .validator()
            .can_move(folder_id, target_parent_id)
    }

    /// Replace the graph with a fresh listing from the remote store.
    pub async fn refresh(&self, owner_id: &OwnerId) -> AppResult<usize> {
        let _structure = self.structure.write().await;
        let folders = self
            .remote("list", self.store.list_folders(owner_id))
            .await
            .map_err(|cause| {
                let err = AppError::with_source(
                    ErrorKind::RemoteFailure,
                    format!("Failed to load folders: {}", cause.message),
                    cause,
                );
                self.notifier.error(&err);
                err
            })?;

        let folder_count = folders.len();
        let report = {
            let mut graph = self.graph.write().await;
            graph.load(folders);
            graph.integrity_report()
        };
        for issue in report.issues() {
            warn!(owner_id = %owner_id, issue = %issue, "Folder listing violates tree invariants");
            self.notifier.error(&AppError::from(issue));
        }

        info!(owner_id = %owner_id, folder_count, "Folder graph refreshed");
        self.notifier.folder(FolderEvent::Refreshed { folder_count });
        Ok(folder_count)
    }

    /// Create a folder under `parent_id` (None = root level).
    pub async fn create_folder(
        &self,
        name: &str,
        parent_id: Option<&FolderId>,
    ) -> AppResult<MutationRecord> {
        let name = validate_folder_name(name, self.config.max_name_length)
            .map_err(|e| self.reject(e))?;
        if parent_id.is_some_and(FolderId::is_provisional) {
            return Err(self.reject(AppError::conflict("Parent folder is still being created")));
        }

        let _structure = self.structure.read().await;
        let _locks = self.locks.acquire(parent_id.cloned()).await;

        let provisional = Folder::new(FolderId::provisional(), name.clone(), parent_id.cloned());
        {
            let mut graph = self.graph.write().await;
            if let Some(parent) = parent_id {
                if !graph.contains(parent) {
                    return Err(self.reject(AppError::not_found("Parent folder not found")));
                }
            }
            graph.insert(provisional.clone());
        }

        let mut mutation = Mutation::begin(MutationKind::Create, provisional.id.clone());
        let created = self
            .dispatch(
                &mut mutation,
                Undo::RemoveProvisional(provisional.id.clone()),
                self.store.create_folder(parent_id, &name),
            )
            .await?;

        self.graph
            .write()
            .await
            .swap_id(&provisional.id, created.clone());
        self.notifier.folder(FolderEvent::IdAssigned {
            provisional_id: provisional.id.clone(),
            folder_id: created.id.clone(),
        });
        mutation.folder_id = created.id;
        self.commit(&mut mutation);
        Ok(mutation.record())
    }

    /// Rename a folder.
    pub async fn rename_folder(&self, folder_id: &FolderId, name: &str) -> AppResult<MutationRecord> {
        let name = validate_folder_name(name, self.config.max_name_length)
            .map_err(|e| self.reject(e))?;
        if folder_id.is_provisional() {
            return Err(self.reject(AppError::conflict("Folder is still being created")));
        }

        let _locks = self.locks.acquire([folder_id.clone()]).await;

        let previous = {
            let mut graph = self.graph.write().await;
            let current = graph
                .get(folder_id)
                .ok_or_else(|| self.reject(AppError::not_found("Folder not found")))?;
            if current.name == name {
                debug!(folder_id = %folder_id, "Rename to current name, nothing to do");
                return Ok(Mutation::unchanged(MutationKind::Rename, folder_id.clone()));
            }
            graph.set_name(folder_id, name.clone()).unwrap_or_default()
        };

        let mut mutation = Mutation::begin(MutationKind::Rename, folder_id.clone());
        self.dispatch(
            &mut mutation,
            Undo::RestoreName {
                folder_id: folder_id.clone(),
                previous,
            },
            self.store.rename_folder(folder_id, &name),
        )
        .await?;

        self.commit(&mut mutation);
        Ok(mutation.record())
    }

    /// Reparent a folder (None = root level). Illegal moves are refused
    /// before the graph is touched.
    pub async fn move_folder(
        &self,
        folder_id: &FolderId,
        new_parent_id: Option<&FolderId>,
    ) -> AppResult<MutationRecord> {
        if folder_id.is_provisional() || new_parent_id.is_some_and(FolderId::is_provisional) {
            return Err(self.reject(AppError::conflict("Folder is still being created")));
        }

        let _structure = self.structure.write().await;
        let old_parent = {
            let graph = self.graph.read().await;
            let current = graph
                .get(folder_id)
                .ok_or_else(|| self.reject(AppError::not_found("Folder not found")))?;
            current.parent_id.clone()
        };

        let lock_ids = [Some(folder_id.clone()), old_parent.clone(), new_parent_id.cloned()];
        let _locks = self.locks.acquire(lock_ids.into_iter().flatten()).await;

        let previous = {
            let mut graph = self.graph.write().await;
            if let Some(target) = new_parent_id {
                if !graph.contains(target) {
                    return Err(self.reject(AppError::not_found("Target folder not found")));
                }
            }
            graph
                .validator()
                .can_move(folder_id, new_parent_id)
                .map_err(|e| self.reject(e.into()))?;
            if old_parent.as_ref() == new_parent_id {
                debug!(folder_id = %folder_id, "Move to current parent, nothing to do");
                return Ok(Mutation::unchanged(MutationKind::Move, folder_id.clone()));
            }
            graph
                .set_parent(folder_id, new_parent_id.cloned())
                .unwrap_or(old_parent)
        };

        let mut mutation = Mutation::begin(MutationKind::Move, folder_id.clone());
        self.dispatch(
            &mut mutation,
            Undo::RestoreParent {
                folder_id: folder_id.clone(),
                previous,
            },
            self.store.move_folder(folder_id, new_parent_id),
        )
        .await?;

        self.commit(&mut mutation);
        Ok(mutation.record())
    }

    /// Delete a folder and, by cascade, its whole subtree.
    pub async fn delete_folder(&self, folder_id: &FolderId) -> AppResult<MutationRecord> {
        if folder_id.is_provisional() {
            return Err(self.reject(AppError::conflict("Folder is still being created")));
        }

        let _structure = self.structure.write().await;
        let subtree = {
            let graph = self.graph.read().await;
            if !graph.contains(folder_id) {
                return Err(self.reject(AppError::not_found("Folder not found")));
            }
            let mut subtree = graph.ancestry().descendants(folder_id);
            subtree.insert(folder_id.clone());
            subtree
        };
        let _locks = self.locks.acquire(subtree).await;

        let removed = self.graph.write().await.remove_subtree(folder_id);
        let folders_removed = removed.len();
        let items_removed: u64 = removed.iter().map(|f| f.item_count).sum();

        let mut mutation = Mutation::begin(MutationKind::Delete, folder_id.clone());
        self.dispatch(
            &mut mutation,
            Undo::RestoreSubtree(removed),
            self.store.delete_folder(folder_id),
        )
        .await?;

        self.commit(&mut mutation);
        self.notifier.folder(FolderEvent::SubtreeDeleted {
            folder_id: folder_id.clone(),
            folders_removed,
            items_removed,
        });
        Ok(mutation.record())
    }

    /// Carry out the end of a drag gesture.
    pub async fn apply_drop(&self, outcome: DropOutcome) -> AppResult<Option<MutationRecord>> {
        match outcome {
            DropOutcome::Move(intent) => self
                .move_folder(&intent.folder_id, intent.new_parent_id.as_ref())
                .await
                .map(Some),
            DropOutcome::Rejected(err) => Err(self.reject(err.into())),
            DropOutcome::Cancelled => Ok(None),
        }
    }

    /// Await a remote call, honoring the optional deadline.
    async fn remote<T>(
        &self,
        call_name: impl fmt::Display,
        call: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        match self.config.remote_timeout() {
            Some(limit) => tokio::time::timeout(limit, call).await.unwrap_or_else(|_| {
                Err(AppError::remote(format!(
                    "Remote {call_name} timed out after {}ms",
                    limit.as_millis()
                )))
            }),
            None => call.await,
        }
    }

    /// Publish the pending state, await the remote call, and roll back with
    /// `undo` if it fails.
    async fn dispatch<T>(
        &self,
        mutation: &mut Mutation,
        undo: Undo,
        call: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        self.notifier.folder(FolderEvent::Pending {
            mutation_id: mutation.id,
            kind: mutation.kind,
            folder_id: mutation.folder_id.clone(),
        });
        mutation.remote_dispatched = true;

        match self.remote(mutation.kind, call).await {
            Ok(value) => Ok(value),
            Err(cause) => {
                undo.apply(&mut *self.graph.write().await);
                mutation.state = MutationState::RolledBack;

                warn!(
                    mutation_id = %mutation.id,
                    kind = %mutation.kind,
                    folder_id = %mutation.folder_id,
                    error = %cause,
                    "Remote store rejected mutation, rolled back"
                );
                self.notifier.folder(FolderEvent::RolledBack {
                    mutation_id: mutation.id,
                    kind: mutation.kind,
                    folder_id: mutation.folder_id.clone(),
                    reason: cause.message.clone(),
                });

                let err = AppError::with_source(
                    ErrorKind::RemoteFailure,
                    format!("Failed to {} folder: {}", mutation.kind, cause.message),
                    cause,
                );
                self.notifier.error(&err);
                Err(err)
            }
        }
    }

    fn commit(&self, mutation: &mut Mutation) {
        mutation.state = MutationState::Committed;
        info!(
            mutation_id = %mutation.id,
            kind = %mutation.kind,
            folder_id = %mutation.folder_id,
            "Folder mutation committed"
        );
        self.notifier.folder(FolderEvent::Committed {
            mutation_id: mutation.id,
            kind: mutation.kind,
            folder_id: mutation.folder_id.clone(),
        });
    }

    /// Report a locally rejected mutation and hand the error back.
    fn reject(&self, err: AppError) -> AppError {
        debug!(kind = %err.kind, message = %err.message, "Mutation rejected");
        self.notifier.error(&err);
        err
    }
}
