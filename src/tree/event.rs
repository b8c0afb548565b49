//! Filesystem change notifications consumed by the reconciler.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Kind of change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Create,
    Update,
    Delete,
}

/// A single change notification for one path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryTreeEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub path: PathBuf,
    /// Only meaningful for `Create`
    #[serde(default)]
    pub is_directory: bool,
}

impl DirectoryTreeEvent {
    pub fn create(path: impl Into<PathBuf>, is_directory: bool) -> Self {
        Self {
            kind: EventKind::Create,
            path: path.into(),
            is_directory,
        }
    }

    pub fn update(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: EventKind::Update,
            path: path.into(),
            is_directory: false,
        }
    }

    pub fn delete(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: EventKind::Delete,
            path: path.into(),
            is_directory: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Events delivered together by the notification stream
pub type EventBatch = Vec<DirectoryTreeEvent>;
