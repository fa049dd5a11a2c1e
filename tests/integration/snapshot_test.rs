//! Integration tests for loading and saving folder snapshots.

mod helpers;

use std::sync::Arc;

use foldertree_core::config::engine::EngineConfig;
use foldertree_core::types::OwnerId;
use foldertree_engine::MutationCoordinator;
use foldertree_store::{MemoryFolderStore, Snapshot};

use helpers::{CHAIN, TestTree, id, owner};

fn temp_path() -> std::path::PathBuf {
    std::env::temp_dir()
        .join(format!("foldertree-it-{}", OwnerId::new()))
        .join("folders.json")
}

#[tokio::test]
async fn test_saved_snapshot_reloads_same_graph() {
    let tree = TestTree::new(CHAIN).await;
    tree.coordinator
        .move_folder(&id("C"), Some(&id("D")))
        .await
        .expect("move");
    tree.coordinator
        .create_folder("Later", Some(&id("C")))
        .await
        .expect("create");

    let path = temp_path();
    tree.store.snapshot().save(&path).await.expect("save");

    let reloaded = MemoryFolderStore::from_snapshot(Snapshot::load(&path, &owner()).await.expect("load"));
    let coordinator = MutationCoordinator::new(Arc::new(reloaded), EngineConfig::default());
    assert_eq!(coordinator.refresh(&owner()).await.expect("refresh"), 5);
    assert_eq!(coordinator.snapshot().await, tree.graph().await);

    if let Some(dir) = path.parent() {
        tokio::fs::remove_dir_all(dir).await.expect("cleanup");
    }
}

#[tokio::test]
async fn test_other_owner_sees_nothing() {
    let store = MemoryFolderStore::from_snapshot(Snapshot {
        owner_id: owner(),
        folders: helpers::folders(CHAIN),
    });
    let coordinator = MutationCoordinator::new(Arc::new(store), EngineConfig::default());
    assert_eq!(
        coordinator
            .refresh(&OwnerId::from("someone-else"))
            .await
            .expect("refresh"),
        0
    );
    assert!(coordinator.graph().await.is_empty());
}
