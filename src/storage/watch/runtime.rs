//! Notify-backed producer for directory tree subscriptions.

use super::events::{EventBatcher, WatchConfig};
use crate::error::StorageError;
use crate::storage::contract::Subscription;
use crate::storage::ignore::IgnoreMatcher;
use crate::tree::{DirectoryTreeEvent, EventBatch};
use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

/// Background watcher feeding one [`Subscription`]
pub struct WatchRuntime {
    root: PathBuf,
    config: WatchConfig,
    ignore: IgnoreMatcher,
    running: Arc<RwLock<bool>>,
}

impl WatchRuntime {
    /// Start watching `root` and return the subscription receiving its batches.
    ///
    /// The watcher thread exits once the subscription is unregistered or dropped.
    pub fn spawn(
        root: &Path,
        config: WatchConfig,
        ignore: IgnoreMatcher,
    ) -> Result<Subscription, StorageError> {
        let (raw_tx, raw_rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            if let Err(e) = raw_tx.send(res) {
                debug!("Dropping watch event after shutdown: {}", e);
            }
        })?;
        watcher.watch(root, RecursiveMode::Recursive)?;

        let (batch_tx, subscription) = Subscription::channel(root);
        let running = Arc::new(RwLock::new(true));
        let runtime = WatchRuntime {
            root: root.to_path_buf(),
            config,
            ignore,
            running: Arc::clone(&running),
        };

        std::thread::Builder::new()
            .name("canopy-watch".to_string())
            .spawn(move || runtime.run(watcher, raw_rx, batch_tx))?;

        info!(workspace = %root.display(), "Watching workspace");
        Ok(subscription.on_unregister(move || {
            *running.write() = false;
        }))
    }

    fn run(
        self,
        watcher: RecommendedWatcher,
        rx: mpsc::Receiver<notify::Result<Event>>,
        tx: UnboundedSender<EventBatch>,
    ) {
        // Keeps the OS watch registered for the lifetime of the loop.
        let _watcher = watcher;
        let mut batcher = EventBatcher::new(self.config.clone());
        let batch_window = self.config.batch_window();
        let mut last_event = Instant::now();

        loop {
            if !*self.running.read() || tx.is_closed() {
                break;
            }

            match rx.recv_timeout(batch_window) {
                Ok(Ok(event)) => {
                    last_event = Instant::now();
                    for change in self.convert_event(event) {
                        if batcher.add_event(change) && !self.flush(&mut batcher, &tx) {
                            return;
                        }
                    }
                }
                Ok(Err(e)) => {
                    warn!("Watch error: {}", e);
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    error!("Watcher channel disconnected");
                    break;
                }
            }

            if !batcher.is_empty()
                && last_event.elapsed() >= batch_window
                && !self.flush(&mut batcher, &tx)
            {
                return;
            }
        }

        info!(workspace = %self.root.display(), "Watch runtime stopped");
    }

    /// Send the pending batch. Returns false when the subscriber is gone.
    fn flush(&self, batcher: &mut EventBatcher, tx: &UnboundedSender<EventBatch>) -> bool {
        let batch = batcher.take_batch();
        debug!(event_count = batch.len(), "Delivering change batch");
        if tx.send(batch).is_err() {
            debug!(workspace = %self.root.display(), "Subscriber gone, stopping watcher");
            return false;
        }
        true
    }

    fn convert_event(&self, event: Event) -> Vec<DirectoryTreeEvent> {
        convert_event(event)
            .into_iter()
            .filter(|change| !self.ignore.is_ignored(&change.path))
            .collect()
    }
}

/// Translate one notify event into tree events. Renames become a Delete of
/// the old path followed by a Create of the new one.
pub(crate) fn convert_event(event: Event) -> Vec<DirectoryTreeEvent> {
    match event.kind {
        EventKind::Create(kind) => event
            .paths
            .into_iter()
            .map(|path| {
                let is_directory = match kind {
                    CreateKind::Folder => true,
                    CreateKind::File => false,
                    _ => path.is_dir(),
                };
                DirectoryTreeEvent::create(path, is_directory)
            })
            .collect(),
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => event
                .paths
                .into_iter()
                .map(DirectoryTreeEvent::delete)
                .collect(),
            RenameMode::To => event.paths.into_iter().map(created_at).collect(),
            RenameMode::Both if event.paths.len() >= 2 => {
                let mut paths = event.paths.into_iter();
                let mut changes = Vec::with_capacity(2);
                if let Some(from) = paths.next() {
                    changes.push(DirectoryTreeEvent::delete(from));
                }
                if let Some(to) = paths.next() {
                    changes.push(created_at(to));
                }
                changes
            }
            _ => event
                .paths
                .into_iter()
                .map(|path| {
                    if path.exists() {
                        created_at(path)
                    } else {
                        DirectoryTreeEvent::delete(path)
                    }
                })
                .collect(),
        },
        EventKind::Modify(_) => event
            .paths
            .into_iter()
            .map(DirectoryTreeEvent::update)
            .collect(),
        EventKind::Remove(_) => event
            .paths
            .into_iter()
            .map(DirectoryTreeEvent::delete)
            .collect(),
        _ => Vec::new(),
    }
}

fn created_at(path: PathBuf) -> DirectoryTreeEvent {
    let is_directory = path.is_dir();
    DirectoryTreeEvent::create(path, is_directory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{DataChange, RemoveKind};

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        let mut event = Event::new(kind);
        for path in paths {
            event = event.add_path(PathBuf::from(path));
        }
        event
    }

    #[test]
    fn test_convert_create_kinds() {
        let changes = convert_event(event(
            EventKind::Create(CreateKind::Folder),
            &["/nonexistent/dir"],
        ));
        assert_eq!(changes, vec![DirectoryTreeEvent::create("/nonexistent/dir", true)]);

        let changes = convert_event(event(
            EventKind::Create(CreateKind::File),
            &["/nonexistent/file"],
        ));
        assert_eq!(changes, vec![DirectoryTreeEvent::create("/nonexistent/file", false)]);
    }

    #[test]
    fn test_convert_modify_and_remove() {
        let changes = convert_event(event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["/w/a"],
        ));
        assert_eq!(changes, vec![DirectoryTreeEvent::update("/w/a")]);

        let changes = convert_event(event(EventKind::Remove(RemoveKind::Any), &["/w/a"]));
        assert_eq!(changes, vec![DirectoryTreeEvent::delete("/w/a")]);
    }

    #[test]
    fn test_convert_rename_both() {
        let changes = convert_event(event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/nonexistent/old", "/nonexistent/new"],
        ));
        assert_eq!(
            changes,
            vec![
                DirectoryTreeEvent::delete("/nonexistent/old"),
                DirectoryTreeEvent::create("/nonexistent/new", false),
            ]
        );
    }

    #[test]
    fn test_access_events_ignored() {
        let changes = convert_event(event(
            EventKind::Access(notify::event::AccessKind::Any),
            &["/w/a"],
        ));
        assert!(changes.is_empty());
    }
}
