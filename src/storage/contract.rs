use crate::error::StorageError;
use crate::tree::EventBatch;
use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tracing::debug;

/// Recursive directory snapshot exchanged with storage.
///
/// Directories listed with `children` are explored; `None` means "not listed".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Directory {
    pub path: PathBuf,
    pub is_directory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Directory>>,
}

impl Directory {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_directory: false,
            children: None,
        }
    }

    pub fn unexplored(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_directory: true,
            children: None,
        }
    }

    pub fn listing(path: impl Into<PathBuf>, children: Vec<Directory>) -> Self {
        Self {
            path: path.into(),
            is_directory: true,
            children: Some(children),
        }
    }
}

/// Filesystem access consumed by a workspace session.
#[async_trait]
pub trait DirectoryStorage: Send + Sync {
    /// Snapshot used to seed the tree when a workspace opens.
    async fn first_load_directory_tree(&self, root: &Path) -> Result<Directory, StorageError>;

    /// One-level listing of `root/relative`.
    async fn explore_directory(&self, root: &Path, relative: &Path)
        -> Result<Directory, StorageError>;

    /// Change notifications for everything below `root`, delivered in batches.
    async fn subscribe_directory_tree(&self, root: &Path) -> Result<Subscription, StorageError>;
}

type UnregisterHook = Box<dyn FnOnce() + Send>;

/// Cancellable stream of event batches scoped to one workspace root.
///
/// After [`Subscription::unregister`] no further batch is yielded, including
/// batches that were already queued. Dropping the subscription unregisters it.
pub struct Subscription {
    root: PathBuf,
    batches: mpsc::UnboundedReceiver<EventBatch>,
    on_unregister: Option<UnregisterHook>,
    active: bool,
}

impl Subscription {
    pub fn new(root: impl Into<PathBuf>, batches: mpsc::UnboundedReceiver<EventBatch>) -> Self {
        Self {
            root: root.into(),
            batches,
            on_unregister: None,
            active: true,
        }
    }

    /// Create a subscription together with the sender feeding it.
    pub fn channel(root: impl Into<PathBuf>) -> (mpsc::UnboundedSender<EventBatch>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(root, rx))
    }

    /// Run `hook` once when the subscription is unregistered.
    pub fn on_unregister<F>(mut self, hook: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_unregister = Some(Box::new(hook));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Next batch, or `None` once unregistered or when the producer is gone.
    pub async fn next_batch(&mut self) -> Option<EventBatch> {
        if !self.active {
            return None;
        }
        self.batches.recv().await
    }

    /// Stop delivery. Idempotent.
    pub fn unregister(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.batches.close();
        if let Some(hook) = self.on_unregister.take() {
            hook();
        }
        debug!(root = %self.root.display(), "Subscription unregistered");
    }
}

impl Stream for Subscription {
    type Item = EventBatch;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if !this.active {
            return Poll::Ready(None);
        }
        this.batches.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unregister();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("root", &self.root)
            .field("active", &self.active)
            .finish()
    }
}
