//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use foldertree_core::config::engine::EngineConfig;
use foldertree_core::events::{EngineEvent, FolderEvent, Notice};
use foldertree_core::types::{FolderId, OwnerId};
use foldertree_engine::{FolderGraph, MutationCoordinator};
use foldertree_entity::folder::Folder;
use foldertree_store::{MemoryFolderStore, Snapshot};

/// A coordinator wired to a memory store, with an event subscription
/// taken after the initial refresh.
pub struct TestTree {
    /// The store behind the coordinator; clones share state.
    pub store: MemoryFolderStore,
    /// The coordinator under test.
    pub coordinator: MutationCoordinator,
    /// Events emitted since the tree was built.
    pub events: broadcast::Receiver<EngineEvent>,
}

impl TestTree {
    /// A tree over `layout` with default settings.
    pub async fn new(layout: &[(&str, &str, Option<&str>)]) -> Self {
        Self::with(layout, EngineConfig::default(), Duration::ZERO).await
    }

    /// A tree over `layout` with custom engine settings and store latency.
    pub async fn with(
        layout: &[(&str, &str, Option<&str>)],
        config: EngineConfig,
        latency: Duration,
    ) -> Self {
        let store = MemoryFolderStore::from_snapshot(Snapshot {
            owner_id: owner(),
            folders: folders(layout),
        })
        .with_latency(latency);
        let coordinator = MutationCoordinator::new(Arc::new(store.clone()), config);
        coordinator.refresh(&owner()).await.expect("initial refresh");
        let events = coordinator.subscribe();
        Self {
            store,
            coordinator,
            events,
        }
    }

    /// Copy of the coordinator's graph.
    pub async fn graph(&self) -> FolderGraph {
        self.coordinator.snapshot().await
    }

    /// Graph built from what the store holds now.
    pub fn stored_graph(&self) -> FolderGraph {
        FolderGraph::from_folders(self.store.snapshot().folders)
    }

    /// Events received so far.
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        std::iter::from_fn(|| self.events.try_recv().ok()).collect()
    }

    /// Folder events received so far.
    pub fn folder_events(&mut self) -> Vec<FolderEvent> {
        self.drain()
            .into_iter()
            .filter_map(|e| e.as_folder().cloned())
            .collect()
    }

    /// Notices received so far.
    pub fn notices(&mut self) -> Vec<Notice> {
        self.drain()
            .into_iter()
            .filter_map(|e| e.as_notice().cloned())
            .collect()
    }
}

/// The owner every test tree belongs to.
pub fn owner() -> OwnerId {
    OwnerId::from("owner-1")
}

/// Folder records from `(id, name, parent)` triples.
pub fn folders(layout: &[(&str, &str, Option<&str>)]) -> Vec<Folder> {
    layout.iter()
        .map(|(id, name, parent)| Folder::new(*id, *name, parent.map(FolderId::from)))
        .collect()
}

/// Shorthand for a folder id.
pub fn id(value: &str) -> FolderId {
    FolderId::from(value)
}

/// A → B → C chain plus an unrelated root D.
pub const CHAIN: &[(&str, &str, Option<&str>)] = &[
    ("A", "A", None),
    ("B", "B", Some("A")),
    ("C", "C", Some("B")),
    ("D", "D", None),
];
