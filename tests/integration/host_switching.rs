use std::path::{Path, PathBuf};

use canopy::error::ApiError;
use canopy::storage::Directory;
use canopy::tree::DirectoryTreeEvent;
use canopy::workspace::WorkspaceHost;

use crate::support::{child_names, next_snapshot, ScriptedStorage};

fn two_roots() -> std::sync::Arc<ScriptedStorage> {
    let storage = ScriptedStorage::new();
    storage.with_snapshot(Directory::listing("/a", vec![Directory::file("/a/one.txt")]));
    storage.with_snapshot(Directory::listing("/b", vec![Directory::file("/b/two.txt")]));
    storage
}

#[tokio::test]
async fn switching_roots_unregisters_previous_subscription() {
    let storage = two_roots();
    let mut host = WorkspaceHost::new(storage.clone());

    host.open("/a").await.unwrap();
    let old_events = storage.sender(Path::new("/a"));

    let session = host.open("/b").await.unwrap();
    assert_eq!(session.root(), Path::new("/b"));
    assert_eq!(storage.unregistered(), vec![PathBuf::from("/a")]);
    assert!(old_events.is_closed());
    assert!(old_events
        .send(vec![DirectoryTreeEvent::create("/a/late.txt", false)])
        .is_err());

    let mut snapshots = session.subscribe_snapshots();
    storage
        .sender(Path::new("/b"))
        .send(vec![DirectoryTreeEvent::create("/b/three.txt", false)])
        .unwrap();
    let tree = next_snapshot(&mut snapshots).await;
    assert_eq!(child_names(&tree), vec!["three.txt", "two.txt"]);

    host.close().await;
    assert!(host.session().is_none());
    assert_eq!(
        storage.unregistered(),
        vec![PathBuf::from("/a"), PathBuf::from("/b")]
    );
}

#[tokio::test]
async fn failed_open_leaves_no_session() {
    let storage = two_roots();
    let mut host = WorkspaceHost::new(storage.clone());
    host.open("/a").await.unwrap();

    let err = host.open("/missing").await.unwrap_err();
    assert!(matches!(err, ApiError::StorageError(_)));
    assert!(host.session().is_none());
    assert_eq!(storage.unregistered(), vec![PathBuf::from("/a")]);
}
