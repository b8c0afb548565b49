use std::path::PathBuf;
use std::sync::Arc;

use canopy::error::ApiError;
use canopy::storage::Directory;
use canopy::tree::find_node;
use canopy::workspace::{ClickIntent, ClickOutcome, ContextMenuHit, MenuItemKind, WorkspaceSession};

use crate::support::{child_names, project_snapshot, ScriptedStorage};

async fn open_project() -> (Arc<ScriptedStorage>, WorkspaceSession) {
    let storage = ScriptedStorage::new();
    storage.with_snapshot(project_snapshot());
    storage.with_listing(Directory::listing(
        "/proj/src",
        vec![
            Directory::file("/proj/src/b.rs"),
            Directory::unexplored("/proj/src/c"),
        ],
    ));
    let session = WorkspaceSession::open(storage.clone(), "/proj").await.unwrap();
    (storage, session)
}

fn src_intent(session: &WorkspaceSession) -> ClickIntent {
    let tree = session.snapshot();
    ClickIntent::for_node(find_node(&tree, &PathBuf::from("/proj/src")).unwrap())
}

#[tokio::test]
async fn explore_orders_children_and_shares_untouched_subtrees() {
    let (_storage, session) = open_project().await;
    let before = session.snapshot();

    session.click(src_intent(&session)).await.unwrap();

    let after = session.snapshot();
    assert!(!Arc::ptr_eq(&before, &after));
    let src = find_node(&after, &PathBuf::from("/proj/src")).unwrap();
    assert_eq!(child_names(src), vec!["c", "b.rs"]);
    assert!(src.children()[0].is_directory() && !src.children()[0].is_explored());
    assert!(Arc::ptr_eq(&before.children()[1], &after.children()[1]));
    session.close().await;
}

#[tokio::test]
async fn explored_directory_toggles_without_fetching() {
    let (storage, session) = open_project().await;
    session.click(src_intent(&session)).await.unwrap();

    let outcome = session.click(src_intent(&session)).await.unwrap();
    assert_eq!(
        outcome,
        ClickOutcome::Toggled {
            path: PathBuf::from("/proj/src"),
            is_open: false
        }
    );
    let outcome = session.click(src_intent(&session)).await.unwrap();
    assert_eq!(
        outcome,
        ClickOutcome::Toggled {
            path: PathBuf::from("/proj/src"),
            is_open: true
        }
    );
    assert_eq!(storage.explore_calls().len(), 1);
    session.close().await;
}

#[tokio::test]
async fn stale_intent_after_explore_is_ignored() {
    let (storage, session) = open_project().await;
    let stale = src_intent(&session);

    session.click(stale.clone()).await.unwrap();
    let before = session.snapshot();
    assert_eq!(session.click(stale).await.unwrap(), ClickOutcome::Ignored);
    assert!(Arc::ptr_eq(&before, &session.snapshot()));
    assert_eq!(storage.explore_calls().len(), 1);
    session.close().await;
}

#[tokio::test]
async fn concurrent_explore_of_same_directory_is_ignored() {
    let (storage, session) = open_project().await;
    let gate = storage.gate_explorations();
    let intent = src_intent(&session);

    let first = session.click(intent.clone());
    tokio::pin!(first);
    let second = tokio::select! {
        biased;
        _ = &mut first => panic!("exploration finished before the gate opened"),
        outcome = session.click(intent) => outcome.unwrap(),
    };
    assert_eq!(second, ClickOutcome::Ignored);

    gate.add_permits(1);
    let first = first.await.unwrap();
    assert!(matches!(first, ClickOutcome::Explored { child_count: 2, .. }));
    assert_eq!(storage.explore_calls().len(), 1);
    session.close().await;
}

#[tokio::test]
async fn fetch_failure_leaves_tree_unchanged_and_allows_retry() {
    let (storage, session) = open_project().await;
    storage.fail_listing("/proj/src");
    let before = session.snapshot();

    let err = session.click(src_intent(&session)).await.unwrap_err();
    assert!(matches!(err, ApiError::StorageError(_)));
    assert!(Arc::ptr_eq(&before, &session.snapshot()));

    storage.with_listing(Directory::listing(
        "/proj/src",
        vec![Directory::file("/proj/src/b.rs")],
    ));
    let outcome = session.click(src_intent(&session)).await.unwrap();
    assert!(matches!(outcome, ClickOutcome::Explored { child_count: 1, .. }));
    session.close().await;
}

#[tokio::test]
async fn context_menu_resolves_index_paths() {
    let (_storage, session) = open_project().await;
    session.click(src_intent(&session)).await.unwrap();

    let hit = |tree_path: Vec<usize>| ContextMenuHit {
        x: 4.0,
        y: 8.0,
        tree_path,
    };
    let root = session.context_menu(&hit(vec![])).unwrap();
    assert_eq!(root.path, PathBuf::from("/proj"));
    assert_eq!(root.item_kind, MenuItemKind::FileTreeItemDirectory);

    let nested = session.context_menu(&hit(vec![0, 1])).unwrap();
    assert_eq!(nested.path, PathBuf::from("/proj/src/b.rs"));
    assert_eq!(nested.item_kind, MenuItemKind::FileTreeItemFile);

    assert!(session.context_menu(&hit(vec![0, 5])).is_none());
    assert!(session.context_menu(&hit(vec![1, 0])).is_none());
    session.close().await;
}

#[tokio::test]
async fn click_on_unknown_path_is_ignored() {
    let (_storage, session) = open_project().await;
    let mut intent = src_intent(&session);
    intent.path = PathBuf::from("/proj/missing");
    assert_eq!(session.click(intent).await.unwrap(), ClickOutcome::Ignored);
    session.close().await;
}
