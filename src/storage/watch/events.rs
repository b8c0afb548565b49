//! Watch configuration and ordered event batching.

use crate::tree::{DirectoryTreeEvent, EventBatch, EventKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

fn default_debounce_ms() -> u64 {
    100
}

fn default_batch_window_ms() -> u64 {
    50
}

fn default_max_batch_size() -> usize {
    100
}

/// Watch mode configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Repeated updates of one path within this window are collapsed (milliseconds)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Pending events are flushed after this much quiet (milliseconds)
    #[serde(default = "default_batch_window_ms")]
    pub batch_window_ms: u64,
    /// Maximum events per batch
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

impl WatchConfig {
    pub fn batch_window(&self) -> Duration {
        Duration::from_millis(self.batch_window_ms.max(1))
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            batch_window_ms: default_batch_window_ms(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

/// Groups raw events into ordered batches.
///
/// A later Create or Delete for a path supersedes the pending event for that
/// path and moves to the end of the batch. Updates never supersede a pending
/// event and are dropped when the same path was updated within the debounce
/// window.
pub(crate) struct EventBatcher {
    config: WatchConfig,
    pending: Vec<DirectoryTreeEvent>,
    last_update: HashMap<PathBuf, Instant>,
}

impl EventBatcher {
    pub(crate) fn new(config: WatchConfig) -> Self {
        Self {
            config,
            pending: Vec::new(),
            last_update: HashMap::new(),
        }
    }

    /// Queue an event. Returns true once the batch is full.
    pub(crate) fn add_event(&mut self, event: DirectoryTreeEvent) -> bool {
        self.add_event_at(event, Instant::now())
    }

    fn add_event_at(&mut self, event: DirectoryTreeEvent, now: Instant) -> bool {
        match event.kind {
            EventKind::Update => {
                if self.pending.iter().any(|e| e.path == event.path) {
                    return self.is_full();
                }
                if let Some(last) = self.last_update.get(&event.path) {
                    if now.duration_since(*last) < self.config.debounce_window() {
                        return self.is_full();
                    }
                }
                self.last_update.insert(event.path.clone(), now);
                self.pending.push(event);
            }
            EventKind::Create | EventKind::Delete => {
                self.pending.retain(|e| e.path != event.path);
                self.last_update.remove(&event.path);
                self.pending.push(event);
            }
        }
        self.is_full()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.pending.len() >= self.config.max_batch_size.max(1)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub(crate) fn take_batch(&mut self) -> EventBatch {
        let window = self.config.debounce_window();
        if let Some(newest) = self.last_update.values().max().copied() {
            self.last_update
                .retain(|_, last| newest.duration_since(*last) < window);
        }
        std::mem::take(&mut self.pending)
    }
}
