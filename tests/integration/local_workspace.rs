use std::fs;
use std::sync::Arc;
use std::time::Duration;

use canopy::config::{CanopyConfig, WorkspaceConfig};
use canopy::storage::{LocalStorage, WatchConfig};
use canopy::tree::find_node;
use canopy::workspace::{ClickIntent, ClickOutcome, WorkspaceSession};

fn storage() -> Arc<LocalStorage> {
    let config = CanopyConfig {
        workspace: WorkspaceConfig::default(),
        watch: WatchConfig {
            debounce_ms: 10,
            batch_window_ms: 20,
            max_batch_size: 100,
        },
        ..CanopyConfig::default()
    };
    Arc::new(LocalStorage::from_config(&config).unwrap())
}

#[tokio::test(flavor = "multi_thread")]
async fn disk_workspace_explores_and_follows_changes() {
    let temp = tempfile::tempdir().unwrap();
    fs::create_dir_all(temp.path().join("src")).unwrap();
    fs::create_dir_all(temp.path().join(".git")).unwrap();
    fs::write(temp.path().join("src/lib.rs"), "").unwrap();
    let root = LocalStorage::resolve_root(temp.path()).unwrap();

    let session = WorkspaceSession::open(storage(), root.clone()).await.unwrap();
    let tree = session.snapshot();
    let names: Vec<_> = tree.children().iter().map(|c| c.name.clone()).collect();
    assert_eq!(names, vec!["src"]);

    let src = find_node(&tree, &root.join("src")).unwrap();
    let outcome = session.click(ClickIntent::for_node(src)).await.unwrap();
    assert!(matches!(outcome, ClickOutcome::Explored { child_count: 1, .. }));

    let mut snapshots = session.subscribe_snapshots();
    snapshots.borrow_and_update();
    fs::write(root.join("src/main.rs"), "fn main() {}").unwrap();

    let found = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if snapshots.changed().await.is_err() {
                return false;
            }
            let tree = snapshots.borrow_and_update().clone();
            if find_node(&tree, &root.join("src/main.rs")).is_some() {
                return true;
            }
        }
    })
    .await;
    assert!(matches!(found, Ok(true)));
    session.close().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn relative_root_is_resolved_and_followed() {
    let temp = tempfile::Builder::new()
        .prefix(".canopy-rel")
        .tempdir_in(".")
        .unwrap();
    let relative = std::path::Path::new(".").join(temp.path().file_name().unwrap());
    let canonical = LocalStorage::resolve_root(temp.path()).unwrap();

    let session = WorkspaceSession::open(storage(), relative).await.unwrap();
    assert_eq!(session.root(), canonical.as_path());
    assert!(session.snapshot().id.is_absolute());

    let mut snapshots = session.subscribe_snapshots();
    snapshots.borrow_and_update();
    fs::write(canonical.join("new.txt"), "").unwrap();

    let found = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if snapshots.changed().await.is_err() {
                return false;
            }
            let tree = snapshots.borrow_and_update().clone();
            if find_node(&tree, &canonical.join("new.txt")).is_some() {
                return true;
            }
        }
    })
    .await;
    assert!(matches!(found, Ok(true)));
    session.close().await;
}
