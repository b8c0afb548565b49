//! Error types for the tree synchronizer and its storage collaborator.

use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by a storage collaborator (snapshot, listing, subscription).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Path {path} is outside workspace root {root}")]
    OutsideRoot { root: PathBuf, path: PathBuf },

    #[error("Watcher error: {0}")]
    WatchError(String),
}

impl From<notify::Error> for StorageError {
    fn from(err: notify::Error) -> Self {
        StorageError::WatchError(err.to_string())
    }
}

/// Errors surfaced to callers of the workspace API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),

    #[error("Workspace session is closed")]
    SessionClosed,
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
