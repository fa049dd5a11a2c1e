//! Integration tests for concurrent mutations.

mod helpers;

use std::time::Duration;

use tokio::time::Instant;

use foldertree_core::config::engine::EngineConfig;
use foldertree_core::error::ErrorKind;
use foldertree_store::StoreOperation;

use helpers::{CHAIN, TestTree, id};

const LATENCY: Duration = Duration::from_millis(50);

async fn slow_tree(layout: &[(&str, &str, Option<&str>)]) -> TestTree {
    TestTree::with(layout, EngineConfig::default(), LATENCY).await
}

#[tokio::test(start_paused = true)]
async fn test_same_folder_mutations_are_serialized() {
    let tree = slow_tree(CHAIN).await;
    let started = Instant::now();

    let d = id("D");
    let (first, second) = tokio::join!(
        tree.coordinator.rename_folder(&d, "First"),
        tree.coordinator.rename_folder(&d, "Second"),
    );
    first.expect("first rename");
    second.expect("second rename");

    assert!(started.elapsed() >= LATENCY * 2);
    assert_eq!(tree.graph().await, tree.stored_graph());
    assert!(tree.coordinator.locks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unrelated_renames_run_concurrently() {
    let tree = slow_tree(CHAIN).await;
    let started = Instant::now();

    let (a_id, d_id) = (id("A"), id("D"));
    let (a, d) = tokio::join!(
        tree.coordinator.rename_folder(&a_id, "Alpha"),
        tree.coordinator.rename_folder(&d_id, "Delta"),
    );
    a.expect("rename a");
    d.expect("rename d");

    assert!(started.elapsed() < LATENCY * 2);
    assert_eq!(tree.graph().await, tree.stored_graph());
}

#[tokio::test(start_paused = true)]
async fn test_crossing_moves_never_form_a_cycle() {
    let tree = slow_tree(&[("P", "P", None), ("Q", "Q", None)]).await;

    let (p, q) = (id("P"), id("Q"));
    let (p_into_q, q_into_p) = tokio::join!(
        tree.coordinator.move_folder(&p, Some(&q)),
        tree.coordinator.move_folder(&q, Some(&p)),
    );

    let outcomes = [p_into_q, q_into_p];
    let committed = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(committed, 1);
    assert!(outcomes
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| e.kind == ErrorKind::CyclicMove));

    let graph = tree.graph().await;
    assert!(graph.integrity_report().is_clean());
    assert_eq!(graph, tree.stored_graph());
}

#[tokio::test(start_paused = true)]
async fn test_rollback_does_not_clobber_later_mutation() {
    let tree = slow_tree(CHAIN).await;
    tree.store.fail_next(StoreOperation::Rename, "rejected");

    let c = id("C");
    let (failed, succeeded) = tokio::join!(
        tree.coordinator.rename_folder(&c, "Doomed"),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            tree.coordinator.rename_folder(&id("C"), "Kept").await
        },
    );
    assert_eq!(failed.unwrap_err().kind, ErrorKind::RemoteFailure);
    succeeded.expect("second rename");

    let graph = tree.graph().await;
    assert_eq!(graph.get(&id("C")).map(|f| f.name.as_str()), Some("Kept"));
    assert_eq!(graph, tree.stored_graph());
}

#[tokio::test(start_paused = true)]
async fn test_delete_waits_for_rename_inside_subtree() {
    let tree = slow_tree(CHAIN).await;

    let c = id("C");
    let (renamed, deleted) = tokio::join!(
        tree.coordinator.rename_folder(&c, "Leaf"),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            tree.coordinator.delete_folder(&id("A")).await
        },
    );
    renamed.expect("rename");
    deleted.expect("delete");

    let graph = tree.graph().await;
    assert_eq!(graph.len(), 1);
    assert_eq!(graph, tree.stored_graph());
}

#[tokio::test(start_paused = true)]
async fn test_move_into_pending_subtree_waits_for_rollback() {
    let tree = slow_tree(&[
        ("P", "P", None),
        ("Q", "Q", Some("P")),
        ("A", "A", Some("Q")),
        ("K", "K", Some("A")),
    ])
    .await;
    let before = tree.graph().await;
    tree.store.fail_next(StoreOperation::Move, "rejected");

    // While A sits at root level, P under K would look legal. Once A's move
    // is reverted it would close the loop P → K → A → Q → P.
    let a = id("A");
    let (detached, reattached) = tokio::join!(
        tree.coordinator.move_folder(&a, None),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            tree.coordinator.move_folder(&id("P"), Some(&id("K"))).await
        },
    );
    assert_eq!(detached.unwrap_err().kind, ErrorKind::RemoteFailure);
    assert_eq!(reattached.unwrap_err().kind, ErrorKind::CyclicMove);
    assert_eq!(tree.store.call_count(StoreOperation::Move), 1);

    let graph = tree.graph().await;
    assert!(graph.integrity_report().is_clean());
    assert_eq!(graph, before);
    assert_eq!(graph, tree.stored_graph());
}

/// Deterministic xorshift so the move sequence is reproducible.
fn next(state: &mut u64) -> u64 {
    *state ^= *state << 13;
    *state ^= *state >> 7;
    *state ^= *state << 17;
    *state
}

#[tokio::test]
async fn test_random_moves_keep_tree_acyclic() {
    let layout: Vec<(String, String, Option<String>)> = (0..12)
        .map(|i| {
            let parent = (i > 0).then(|| format!("f{}", (i - 1) / 2));
            (format!("f{i}"), format!("Folder {i}"), parent)
        })
        .collect();
    let layout: Vec<(&str, &str, Option<&str>)> = layout
        .iter()
        .map(|(i, n, p)| (i.as_str(), n.as_str(), p.as_deref()))
        .collect();
    let tree = TestTree::new(&layout).await;

    let mut state = 0x9E37_79B9_7F4A_7C15;
    let mut committed = 0;
    for _ in 0..200 {
        let folder = id(&format!("f{}", next(&mut state) % 12));
        let roll = next(&mut state) % 13;
        let target = (roll < 12).then(|| id(&format!("f{roll}")));

        match tree.coordinator.move_folder(&folder, target.as_ref()).await {
            Ok(_) => committed += 1,
            Err(err) => assert_eq!(err.kind, ErrorKind::CyclicMove),
        }
        let graph = tree.graph().await;
        assert!(graph.integrity_report().is_clean());
        for f in graph.all() {
            assert!(graph.ancestry().ancestor_chain(&f.id).is_ok());
        }
    }

    assert!(committed > 0);
    assert_eq!(tree.graph().await, tree.stored_graph());
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_creates_under_one_parent() {
    let tree = slow_tree(CHAIN).await;
    let names: Vec<String> = (0..5).map(|i| format!("Child {i}")).collect();

    let a = id("A");
    let results = futures::future::join_all(
        names
            .iter()
            .map(|name| tree.coordinator.create_folder(name, Some(&a))),
    )
    .await;
    assert!(results.iter().all(|r| r.is_ok()));

    let graph = tree.graph().await;
    assert_eq!(graph.children(Some(&id("A"))).len(), 6);
    assert!(graph.all().iter().all(|f| !f.is_provisional()));
    assert_eq!(graph, tree.stored_graph());
}
