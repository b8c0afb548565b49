//! Workspace session: a single-writer actor over the current tree.
//!
//! Every mutation (change batch, explore result, toggle) is applied by one
//! task against the latest published root, then published through a
//! `watch` channel. Readers only ever see complete snapshots.

use crate::error::{ApiError, StorageError};
use crate::storage::{Directory, DirectoryStorage};
use crate::tree::path::relative_path;
use crate::tree::{
    find_by_index_path, find_node, graft_listing, reconcile, toggle_open, EventBatch,
    GraftOutcome, NodeRef, TreeNode,
};
use crate::workspace::intents::{
    ClickIntent, ClickOutcome, ContextMenuHit, ContextMenuRequest, EntryKind,
};
use crate::workspace::subscription::SubscriptionManager;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

type ClickReply = oneshot::Sender<Result<ClickOutcome, ApiError>>;

enum Command {
    Click { intent: ClickIntent, reply: ClickReply },
    Close { reply: oneshot::Sender<()> },
}

struct ExploreDone {
    path: PathBuf,
    result: Result<Directory, StorageError>,
    reply: ClickReply,
}

/// Handle to a live workspace. Dropping it stops the actor and unregisters
/// the change subscription.
pub struct WorkspaceSession {
    root: PathBuf,
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<NodeRef>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl WorkspaceSession {
    /// Load the initial snapshot, subscribe to changes below the root, and
    /// start the actor. Fails without side effects if either storage call fails.
    pub async fn open(
        storage: Arc<dyn DirectoryStorage>,
        root: impl Into<PathBuf>,
    ) -> Result<Self, ApiError> {
        let requested = root.into();
        let listing = storage
            .first_load_directory_tree(&requested)
            .await
            .map_err(|e| {
                error!(root = %requested.display(), error = %e, "Initial load failed");
                e
            })?;
        if !listing.is_directory {
            return Err(StorageError::NotADirectory(listing.path).into());
        }

        let tree: NodeRef = Arc::new(TreeNode::root_from_directory(listing));
        let root = tree.id.clone();
        let mut subscriptions = SubscriptionManager::new();
        subscriptions.activate(storage.subscribe_directory_tree(&root).await?);
        info!(root = %root.display(), nodes = tree.node_count(), "Workspace session opened");

        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (snapshots_tx, snapshots_rx) = watch::channel(Arc::clone(&tree));

        let actor = SessionActor {
            root: root.clone(),
            storage,
            current: tree,
            snapshots: snapshots_tx,
            subscriptions,
            in_flight: HashSet::new(),
            commands: commands_rx,
            completions_tx,
            completions: completions_rx,
        };
        let task = tokio::spawn(actor.run());

        Ok(Self {
            root,
            commands: commands_tx,
            snapshots: snapshots_rx,
            task: Mutex::new(Some(task)),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Latest published tree.
    pub fn snapshot(&self) -> NodeRef {
        Arc::clone(&self.snapshots.borrow())
    }

    /// Receiver notified whenever a new root is published.
    pub fn subscribe_snapshots(&self) -> watch::Receiver<NodeRef> {
        self.snapshots.clone()
    }

    /// Handle an expand/click intent.
    ///
    /// Files yield [`ClickOutcome::OpenFile`]. Explored directories toggle
    /// locally. Unexplored directories are fetched from storage; a fetch
    /// failure is returned and leaves the tree untouched.
    pub async fn click(&self, intent: ClickIntent) -> Result<ClickOutcome, ApiError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Click { intent, reply })
            .map_err(|_| ApiError::SessionClosed)?;
        response.await.map_err(|_| ApiError::SessionClosed)?
    }

    /// Resolve a UI hit against the current snapshot.
    pub fn context_menu(&self, hit: &ContextMenuHit) -> Option<ContextMenuRequest> {
        let snapshot = self.snapshot();
        let node = find_by_index_path(&snapshot, &hit.tree_path)?;
        Some(ContextMenuRequest::for_node(hit, node))
    }

    /// Stop the actor and wait until its subscription is unregistered.
    pub async fn close(&self) {
        let (reply, done) = oneshot::channel();
        if self.commands.send(Command::Close { reply }).is_ok() {
            let _ = done.await;
        }
        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(root = %self.root.display(), error = %e, "Session task ended abnormally");
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}

impl std::fmt::Debug for WorkspaceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceSession")
            .field("root", &self.root)
            .field("closed", &self.is_closed())
            .finish()
    }
}

struct SessionActor {
    root: PathBuf,
    storage: Arc<dyn DirectoryStorage>,
    current: NodeRef,
    snapshots: watch::Sender<NodeRef>,
    subscriptions: SubscriptionManager,
    in_flight: HashSet<PathBuf>,
    commands: mpsc::UnboundedReceiver<Command>,
    completions_tx: mpsc::UnboundedSender<ExploreDone>,
    completions: mpsc::UnboundedReceiver<ExploreDone>,
}

impl SessionActor {
    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Click { intent, reply }) => self.handle_click(intent, reply),
                    Some(Command::Close { reply }) => {
                        self.subscriptions.unregister();
                        let _ = reply.send(());
                        break;
                    }
                    None => break,
                },
                Some(done) = self.completions.recv() => self.finish_explore(done),
                Some((root, batch)) = self.subscriptions.next_batch() => {
                    self.apply_batch(&root, batch);
                }
            }
        }
        self.subscriptions.unregister();
        info!(root = %self.root.display(), "Workspace session closed");
    }

    fn publish(&mut self, root: NodeRef) {
        if Arc::ptr_eq(&root, &self.current) {
            return;
        }
        self.current = Arc::clone(&root);
        self.snapshots.send_replace(root);
    }

    fn apply_batch(&mut self, batch_root: &Path, batch: EventBatch) {
        if batch_root != self.root {
            debug!(
                batch_root = %batch_root.display(),
                root = %self.root.display(),
                "Dropping batch for another root"
            );
            return;
        }
        let result = reconcile(&self.current, &batch);
        debug!(
            event_count = batch.len(),
            created = result.report.created,
            deleted = result.report.deleted,
            skipped = result.report.skipped.len(),
            "Reconciled batch"
        );
        if result.changed {
            self.publish(result.root);
        }
    }

    fn handle_click(&mut self, intent: ClickIntent, reply: ClickReply) {
        let Some(node) = find_node(&self.current, &intent.path) else {
            debug!(path = %intent.path.display(), "Click on unknown path ignored");
            let _ = reply.send(Ok(ClickOutcome::Ignored));
            return;
        };

        if node.is_file() {
            let outcome = match intent.kind {
                EntryKind::File => ClickOutcome::OpenFile { path: intent.path },
                EntryKind::Directory => ClickOutcome::Ignored,
            };
            let _ = reply.send(Ok(outcome));
            return;
        }

        // The UI's view lags the tree; a mismatch means this click raced
        // with an earlier one.
        if intent.kind == EntryKind::File
            || intent.explored != node.is_explored()
            || self.in_flight.contains(&intent.path)
        {
            debug!(path = %intent.path.display(), "Stale click ignored");
            let _ = reply.send(Ok(ClickOutcome::Ignored));
            return;
        }

        if node.is_explored() {
            let outcome = match toggle_open(&self.current, &intent.path) {
                Some((root, is_open)) => {
                    self.publish(root);
                    ClickOutcome::Toggled {
                        path: intent.path,
                        is_open,
                    }
                }
                None => ClickOutcome::Ignored,
            };
            let _ = reply.send(Ok(outcome));
            return;
        }

        self.start_explore(intent.path, reply);
    }

    fn start_explore(&mut self, path: PathBuf, reply: ClickReply) {
        let Some(relative) = relative_path(&self.root, &path) else {
            let _ = reply.send(Err(ApiError::InvalidPath(path)));
            return;
        };
        self.in_flight.insert(path.clone());
        debug!(path = %path.display(), "Exploring directory");

        let storage = Arc::clone(&self.storage);
        let root = self.root.clone();
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = storage.explore_directory(&root, &relative).await;
            // The actor may be gone; the caller then sees SessionClosed.
            let _ = completions.send(ExploreDone {
                path,
                result,
                reply,
            });
        });
    }

    fn finish_explore(&mut self, done: ExploreDone) {
        let ExploreDone {
            path,
            result,
            reply,
        } = done;
        self.in_flight.remove(&path);

        let listing = match result {
            Ok(listing) => listing,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Exploration failed");
                let _ = reply.send(Err(e.into()));
                return;
            }
        };

        let outcome = match graft_listing(&self.current, &path, listing) {
            GraftOutcome::Grafted(root) => {
                let child_count = find_node(&root, &path)
                    .map(|node| node.children().len())
                    .unwrap_or_default();
                self.publish(root);
                ClickOutcome::Explored { path, child_count }
            }
            other => {
                warn!(path = %path.display(), outcome = ?other, "Listing not grafted");
                ClickOutcome::Ignored
            }
        };
        let _ = reply.send(Ok(outcome));
    }
}
