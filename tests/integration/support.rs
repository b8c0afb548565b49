use async_trait::async_trait;
use canopy::error::StorageError;
use canopy::storage::{Directory, DirectoryStorage, Subscription};
use canopy::tree::{EventBatch, NodeRef};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::{watch, Semaphore};

/// In-memory storage driven by the test: fixed snapshots and listings, plus
/// a sender per subscribed root for injecting change batches.
#[derive(Default)]
pub struct ScriptedStorage {
    snapshots: Mutex<HashMap<PathBuf, Directory>>,
    listings: Mutex<HashMap<PathBuf, Directory>>,
    failing: Mutex<Vec<PathBuf>>,
    senders: Mutex<HashMap<PathBuf, UnboundedSender<EventBatch>>>,
    unregistered: Arc<Mutex<Vec<PathBuf>>>,
    explore_calls: Mutex<Vec<(PathBuf, PathBuf)>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl ScriptedStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_snapshot(&self, snapshot: Directory) {
        self.snapshots.lock().insert(snapshot.path.clone(), snapshot);
    }

    pub fn with_listing(&self, listing: Directory) {
        self.failing.lock().retain(|p| p != &listing.path);
        self.listings.lock().insert(listing.path.clone(), listing);
    }

    pub fn fail_listing(&self, path: impl Into<PathBuf>) {
        self.failing.lock().push(path.into());
    }

    /// Hold every exploration until the returned semaphore gets a permit.
    pub fn gate_explorations(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn sender(&self, root: &Path) -> UnboundedSender<EventBatch> {
        self.senders.lock().get(root).cloned().unwrap()
    }

    pub fn unregistered(&self) -> Vec<PathBuf> {
        self.unregistered.lock().clone()
    }

    pub fn explore_calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.explore_calls.lock().clone()
    }
}

#[async_trait]
impl DirectoryStorage for ScriptedStorage {
    async fn first_load_directory_tree(&self, root: &Path) -> Result<Directory, StorageError> {
        self.snapshots
            .lock()
            .get(root)
            .cloned()
            .ok_or_else(|| StorageError::NotADirectory(root.to_path_buf()))
    }

    async fn explore_directory(
        &self,
        root: &Path,
        relative: &Path,
    ) -> Result<Directory, StorageError> {
        self.explore_calls
            .lock()
            .push((root.to_path_buf(), relative.to_path_buf()));
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }

        let target = root.join(relative);
        if self.failing.lock().contains(&target) {
            return Err(StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "scripted failure",
            )));
        }
        Ok(self
            .listings
            .lock()
            .get(&target)
            .cloned()
            .unwrap_or_else(|| Directory::listing(&target, Vec::new())))
    }

    async fn subscribe_directory_tree(&self, root: &Path) -> Result<Subscription, StorageError> {
        let (tx, subscription) = Subscription::channel(root);
        self.senders.lock().insert(root.to_path_buf(), tx);
        let unregistered = Arc::clone(&self.unregistered);
        let root = root.to_path_buf();
        Ok(subscription.on_unregister(move || unregistered.lock().push(root)))
    }
}

/// `/proj` with an unexplored `src` and a `readme.md`.
pub fn project_snapshot() -> Directory {
    Directory::listing(
        "/proj",
        vec![
            Directory::unexplored("/proj/src"),
            Directory::file("/proj/readme.md"),
        ],
    )
}

/// Wait for the next published snapshot.
pub async fn next_snapshot(snapshots: &mut watch::Receiver<NodeRef>) -> NodeRef {
    tokio::time::timeout(Duration::from_secs(2), snapshots.changed())
        .await
        .expect("no snapshot published in time")
        .unwrap();
    let snapshot = snapshots.borrow_and_update().clone();
    snapshot
}

pub fn child_names(node: &NodeRef) -> Vec<String> {
    node.children().iter().map(|c| c.name.clone()).collect()
}
