//! Integration tests for projections, expansion and drag-and-drop over a
//! live coordinator.

mod helpers;

use std::collections::HashSet;

use foldertree_core::error::ErrorKind;
use foldertree_core::events::FolderEvent;
use foldertree_core::types::FolderId;
use foldertree_engine::{DragSession, DropOutcome, DropTarget, ExpansionState, MoveError, ProjectionMode};
use foldertree_store::StoreOperation;

use helpers::{CHAIN, TestTree, id};

const LIBRARY: &[(&str, &str, Option<&str>)] = &[
    ("projects", "Projects", None),
    ("old", "Old", None),
    ("px", "Project X", Some("old")),
    ("archive", "Archive", None),
    ("notes", "Notes", Some("px")),
];

fn ids(rows: impl IntoIterator<Item = FolderId>) -> HashSet<FolderId> {
    rows.into_iter().collect()
}

#[tokio::test]
async fn test_search_shows_matches_with_ancestors() {
    let tree = TestTree::new(LIBRARY).await;
    let mode = ProjectionMode::Search("proj".into());

    let projected = tree.coordinator.project(&mode, None).await.expect("project");
    assert_eq!(
        ids(projected.ids()),
        ids([id("projects"), id("old"), id("px")])
    );

    let graph = tree.coordinator.graph().await;
    let mut expansion = ExpansionState::new();
    assert_eq!(expansion.reveal_matches(&graph, "proj"), 2);
    drop(graph);

    let projected = tree
        .coordinator
        .project(&mode, Some(&expansion))
        .await
        .expect("project");
    let rows: Vec<FolderId> = projected.visible_rows().into_iter().map(|r| r.id).collect();
    assert!(rows.contains(&id("px")));
    assert!(!rows.contains(&id("notes")));
}

#[tokio::test]
async fn test_search_follows_rename() {
    let tree = TestTree::new(LIBRARY).await;
    tree.coordinator
        .rename_folder(&id("archive"), "Project Archive")
        .await
        .expect("rename");

    let projected = tree
        .coordinator
        .project(&ProjectionMode::Search("PROJECT".into()), None)
        .await
        .expect("project");
    assert!(projected.find(&id("archive")).is_some_and(|n| n.matched));
}

#[tokio::test]
async fn test_scoped_view_of_selection() {
    let tree = TestTree::new(LIBRARY).await;
    let graph = tree.coordinator.graph().await;
    let expansion = ExpansionState::for_selection(&graph, Some(&id("px"))).expect("expansion");
    drop(graph);
    assert!(expansion.is_expanded(&id("old")));

    let projected = tree
        .coordinator
        .project(&ProjectionMode::Scoped(id("px")), Some(&expansion))
        .await
        .expect("project");
    assert_eq!(ids(projected.ids()), ids([id("old"), id("px"), id("notes")]));

    let err = tree
        .coordinator
        .project(&ProjectionMode::Scoped(id("nope")), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_dangling_parent_renders_at_root() {
    let tree = TestTree::new(&[("a", "A", None), ("orphan", "Orphan", Some("gone"))]).await;
    let projected = tree
        .coordinator
        .project(&ProjectionMode::Full, None)
        .await
        .expect("project");
    assert_eq!(projected.roots.len(), 2);

    let report = tree.coordinator.graph().await.integrity_report();
    assert_eq!(report.dangling, vec![(id("orphan"), id("gone"))]);
}

#[tokio::test]
async fn test_drag_and_drop_moves_folder() {
    let tree = TestTree::new(CHAIN).await;
    let mut drag = DragSession::new();

    drag.begin(id("C"));
    {
        let graph = tree.coordinator.graph().await;
        drag.hover(&graph, DropTarget::Folder(id("D"))).expect("legal target");
    }
    let record = tree
        .coordinator
        .apply_drop(drag.drop_here())
        .await
        .expect("drop")
        .expect("moved");
    assert_eq!(record.folder_id, id("C"));
    assert_eq!(
        tree.graph().await.get(&id("C")).and_then(|f| f.parent_id.clone()),
        Some(id("D"))
    );
}

#[tokio::test]
async fn test_illegal_drop_makes_no_remote_call() {
    let tree = TestTree::new(CHAIN).await;
    let before = tree.graph().await;
    let mut drag = DragSession::new();

    drag.begin(id("A"));
    {
        let graph = tree.coordinator.graph().await;
        let disabled = graph.validator().disabled_targets(&id("A"));
        assert_eq!(disabled, ids([id("A"), id("B"), id("C")]));
        assert_eq!(
            drag.hover(&graph, DropTarget::Folder(id("C"))),
            Err(MoveError::CyclicMove)
        );
    }
    let outcome = drag.drop_here();
    assert_eq!(outcome, DropOutcome::Rejected(MoveError::CyclicMove));

    let err = tree.coordinator.apply_drop(outcome).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::CyclicMove);
    assert_eq!(tree.store.call_count(StoreOperation::Move), 0);
    assert_eq!(tree.graph().await, before);
}

#[tokio::test]
async fn test_expansion_follows_assigned_id() {
    let mut tree = TestTree::new(CHAIN).await;
    let record = tree
        .coordinator
        .create_folder("Inbox", Some(&id("A")))
        .await
        .expect("create");

    let mut expansion = ExpansionState::new();
    for event in tree.folder_events() {
        match event {
            FolderEvent::Pending { folder_id, .. } => expansion.expand(&folder_id),
            FolderEvent::IdAssigned {
                provisional_id,
                folder_id,
            } => expansion.remap(&provisional_id, &folder_id),
            _ => {}
        }
    }
    assert!(expansion.is_expanded(&record.folder_id));
    assert_eq!(expansion.len(), 1);

    tree.coordinator
        .delete_folder(&id("A"))
        .await
        .expect("delete");
    let graph = tree.coordinator.graph().await;
    expansion.retain_existing(&graph);
    assert!(expansion.is_empty());
}
