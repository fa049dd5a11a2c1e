//! Integration tests for optimistic folder mutations against the memory store.

mod helpers;

use std::time::Duration;

use foldertree_core::config::engine::EngineConfig;
use foldertree_core::error::ErrorKind;
use foldertree_core::events::{FolderEvent, NoticeLevel};
use foldertree_core::types::{MutationKind, MutationState};
use foldertree_store::StoreOperation;

use helpers::{CHAIN, TestTree, id};

#[tokio::test]
async fn test_create_commits_and_mirrors_store() {
    let mut tree = TestTree::new(CHAIN).await;

    let record = tree
        .coordinator
        .create_folder(" Invoices ", Some(&id("D")))
        .await
        .expect("create");

    assert_eq!(record.state, MutationState::Committed);
    assert!(!record.folder_id.is_provisional());
    assert_eq!(tree.graph().await, tree.stored_graph());
    assert_eq!(
        tree.store.get(&record.folder_id).map(|f| f.name),
        Some("Invoices".to_string())
    );

    let events = tree.folder_events();
    let assigned = events.iter().find_map(|e| match e {
        FolderEvent::IdAssigned {
            provisional_id,
            folder_id,
        } => Some((provisional_id.clone(), folder_id.clone())),
        _ => None,
    });
    let (provisional_id, folder_id) = assigned.expect("id assigned");
    assert!(provisional_id.is_provisional());
    assert_eq!(folder_id, record.folder_id);
}

#[tokio::test]
async fn test_blank_name_makes_no_remote_call() {
    let mut tree = TestTree::new(CHAIN).await;
    let before = tree.graph().await;

    for name in ["", "   ", "\t\n"] {
        let err = tree.coordinator.create_folder(name, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "Folder name cannot be empty");
    }
    let err = tree
        .coordinator
        .rename_folder(&id("A"), "  ")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    assert_eq!(tree.store.call_count(StoreOperation::Create), 0);
    assert_eq!(tree.store.call_count(StoreOperation::Rename), 0);
    assert_eq!(tree.graph().await, before);
    assert!(tree
        .notices()
        .iter()
        .all(|n| n.level == NoticeLevel::Warning && n.kind == Some(ErrorKind::Validation)));
}

#[tokio::test]
async fn test_over_long_name_is_rejected() {
    let config = EngineConfig {
        max_name_length: 10,
        ..EngineConfig::default()
    };
    let tree = TestTree::with(CHAIN, config, Duration::ZERO).await;
    let err = tree
        .coordinator
        .create_folder("a name that is too long", None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(tree.store.total_calls(), 1);
}

#[tokio::test]
async fn test_scenario_abc_moves() {
    let tree = TestTree::new(CHAIN).await;
    let before = tree.graph().await;

    let err = tree
        .coordinator
        .move_folder(&id("A"), Some(&id("C")))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::CyclicMove);
    assert_eq!(err.message, "Cannot move a folder into its own subfolder");
    assert_eq!(tree.store.call_count(StoreOperation::Move), 0);
    assert_eq!(tree.graph().await, before);

    tree.store.fail_next(StoreOperation::Move, "server said no");
    let err = tree
        .coordinator
        .move_folder(&id("C"), Some(&id("A")))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RemoteFailure);
    assert_eq!(tree.graph().await, before);
    assert_eq!(tree.graph().await.get(&id("C")).and_then(|f| f.parent_id.clone()), Some(id("B")));

    tree.coordinator
        .move_folder(&id("C"), Some(&id("A")))
        .await
        .expect("move");
    assert_eq!(tree.graph().await.get(&id("C")).and_then(|f| f.parent_id.clone()), Some(id("A")));
    assert_eq!(tree.graph().await, tree.stored_graph());
}

#[tokio::test]
async fn test_self_parent_is_rejected() {
    let tree = TestTree::new(CHAIN).await;
    let err = tree
        .coordinator
        .move_folder(&id("B"), Some(&id("B")))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::CyclicMove);
    assert_eq!(err.message, "Cannot move a folder into itself");
    assert_eq!(tree.store.total_calls(), 1);
}

#[tokio::test]
async fn test_every_failed_mutation_restores_graph() {
    let mut tree = TestTree::new(CHAIN).await;
    let before = tree.graph().await;

    tree.store.set_failing(StoreOperation::Create, "down");
    tree.store.set_failing(StoreOperation::Rename, "down");
    tree.store.set_failing(StoreOperation::Move, "down");
    tree.store.set_failing(StoreOperation::Delete, "down");

    let failures = [
        tree.coordinator.create_folder("New", Some(&id("B"))).await,
        tree.coordinator.rename_folder(&id("B"), "Renamed").await,
        tree.coordinator.move_folder(&id("B"), None).await,
        tree.coordinator.delete_folder(&id("A")).await,
    ];
    for result in failures {
        let err = result.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RemoteFailure);
        assert_eq!(tree.graph().await, before);
    }

    let rolled_back: Vec<MutationKind> = tree
        .folder_events()
        .into_iter()
        .filter_map(|e| match e {
            FolderEvent::RolledBack { kind, reason, .. } => {
                assert_eq!(reason, "down");
                Some(kind)
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        rolled_back,
        vec![
            MutationKind::Create,
            MutationKind::Rename,
            MutationKind::Move,
            MutationKind::Delete
        ]
    );
}

#[tokio::test]
async fn test_rollback_reports_error_notice() {
    let mut tree = TestTree::new(CHAIN).await;
    tree.store.fail_next(StoreOperation::Rename, "quota exceeded");

    let err = tree
        .coordinator
        .rename_folder(&id("D"), "Docs")
        .await
        .unwrap_err();
    assert_eq!(err.message, "Failed to rename folder: quota exceeded");

    let events = tree.drain();
    let states: Vec<_> = events
        .iter()
        .filter_map(|e| e.as_folder().and_then(FolderEvent::state))
        .collect();
    assert_eq!(states, vec![MutationState::Pending, MutationState::RolledBack]);

    let notice = events
        .iter()
        .find_map(|e| e.as_notice())
        .expect("notice");
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, "Failed to rename folder: quota exceeded");
}

#[tokio::test]
async fn test_delete_cascades_through_subtree() {
    let mut tree = TestTree::new(&[
        ("A", "A", None),
        ("B", "B", Some("A")),
        ("C", "C", Some("B")),
        ("E", "E", Some("A")),
        ("D", "D", None),
    ])
    .await;

    tree.coordinator.delete_folder(&id("A")).await.expect("delete");

    let graph = tree.graph().await;
    assert_eq!(graph.len(), 1);
    assert_eq!(graph, tree.stored_graph());

    let deleted = tree.folder_events().into_iter().find_map(|e| match e {
        FolderEvent::SubtreeDeleted {
            folder_id,
            folders_removed,
            ..
        } => Some((folder_id, folders_removed)),
        _ => None,
    });
    assert_eq!(deleted, Some((id("A"), 4)));
}

#[tokio::test]
async fn test_unknown_folder_is_not_found_without_remote_call() {
    let tree = TestTree::new(CHAIN).await;
    let err = tree
        .coordinator
        .rename_folder(&id("missing"), "X")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    let err = tree.coordinator.delete_folder(&id("missing")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    let err = tree
        .coordinator
        .move_folder(&id("A"), Some(&id("missing")))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(tree.store.total_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_elapsed_timeout_is_a_failure() {
    let config = EngineConfig {
        remote_timeout_ms: Some(20),
        ..EngineConfig::default()
    };
    let tree = TestTree::with(CHAIN, config, Duration::ZERO).await;
    tree.store.set_latency(Duration::from_millis(200));
    let before = tree.graph().await;

    let err = tree
        .coordinator
        .move_folder(&id("C"), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RemoteFailure);
    assert!(err.message.contains("timed out"));
    assert_eq!(tree.graph().await, before);
    assert_eq!(tree.stored_graph(), before);
}

#[tokio::test]
async fn test_rename_then_move_created_folder() {
    let tree = TestTree::new(CHAIN).await;
    let record = tree
        .coordinator
        .create_folder("Draft", None)
        .await
        .expect("create");

    tree.coordinator
        .rename_folder(&record.folder_id, "Final")
        .await
        .expect("rename");
    tree.coordinator
        .move_folder(&record.folder_id, Some(&id("C")))
        .await
        .expect("move");

    let graph = tree.graph().await;
    let folder = graph.get(&record.folder_id).expect("folder");
    assert_eq!(folder.name, "Final");
    assert_eq!(folder.parent_id, Some(id("C")));
    assert_eq!(graph, tree.stored_graph());
}
