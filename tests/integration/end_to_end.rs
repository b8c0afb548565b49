use std::path::PathBuf;
use std::sync::Arc;

use canopy::storage::Directory;
use canopy::tree::{find_node, graft_listing, reconcile, DirectoryTreeEvent, GraftOutcome, TreeNode};
use canopy::workspace::{ClickIntent, ClickOutcome, WorkspaceSession};

use crate::support::{child_names, next_snapshot, project_snapshot, ScriptedStorage};

#[test]
fn unexplored_create_explore_then_delete() {
    let root = Arc::new(TreeNode::root_from_directory(project_snapshot()));

    let dropped = reconcile(
        &root,
        &[DirectoryTreeEvent::create("/proj/src/main.go", false)],
    );
    assert!(!dropped.changed);
    assert!(Arc::ptr_eq(&dropped.root, &root));

    let listing = Directory::listing("/proj/src", vec![Directory::file("/proj/src/main.go")]);
    let explored = match graft_listing(&root, &PathBuf::from("/proj/src"), listing) {
        GraftOutcome::Grafted(tree) => tree,
        other => panic!("unexpected graft outcome: {:?}", other),
    };
    let src = find_node(&explored, &PathBuf::from("/proj/src")).unwrap();
    assert!(src.is_explored());
    assert_eq!(child_names(src), vec!["main.go"]);

    let deleted = reconcile(
        &explored,
        &[DirectoryTreeEvent::delete("/proj/src/main.go")],
    );
    assert!(deleted.changed);
    assert!(!Arc::ptr_eq(&deleted.root, &explored));
    let src = find_node(&deleted.root, &PathBuf::from("/proj/src")).unwrap();
    assert!(src.children().is_empty());
    assert!(src.is_explored());
}

#[tokio::test]
async fn session_follows_the_same_scenario() {
    let storage = ScriptedStorage::new();
    storage.with_snapshot(project_snapshot());
    storage.with_listing(Directory::listing(
        "/proj/src",
        vec![Directory::file("/proj/src/main.go")],
    ));
    let session = WorkspaceSession::open(storage.clone(), "/proj").await.unwrap();
    let mut snapshots = session.subscribe_snapshots();
    let events = storage.sender(&PathBuf::from("/proj"));

    // The first batch is dropped; the probe in the second one proves it was processed.
    events
        .send(vec![DirectoryTreeEvent::create("/proj/src/main.go", false)])
        .unwrap();
    events
        .send(vec![DirectoryTreeEvent::create("/proj/probe.txt", false)])
        .unwrap();
    let tree = next_snapshot(&mut snapshots).await;
    assert_eq!(child_names(&tree), vec!["src", "probe.txt", "readme.md"]);
    let src = find_node(&tree, &PathBuf::from("/proj/src")).unwrap();
    assert!(src.children().is_empty());
    assert!(!src.is_explored());

    let outcome = session.click(ClickIntent::for_node(src)).await.unwrap();
    assert_eq!(
        outcome,
        ClickOutcome::Explored {
            path: PathBuf::from("/proj/src"),
            child_count: 1
        }
    );
    assert_eq!(
        storage.explore_calls(),
        vec![(PathBuf::from("/proj"), PathBuf::from("src"))]
    );
    let tree = next_snapshot(&mut snapshots).await;
    let src = find_node(&tree, &PathBuf::from("/proj/src")).unwrap();
    assert!(src.is_explored() && src.is_open());
    assert_eq!(child_names(src), vec!["main.go"]);

    events
        .send(vec![DirectoryTreeEvent::delete("/proj/src/main.go")])
        .unwrap();
    let after_delete = next_snapshot(&mut snapshots).await;
    assert!(!Arc::ptr_eq(&after_delete, &tree));
    let src = find_node(&after_delete, &PathBuf::from("/proj/src")).unwrap();
    assert!(src.children().is_empty());

    session.close().await;
}
