//! Disk-backed storage: walkdir snapshots, one-level listings, notify subscriptions.

use super::contract::{Directory, DirectoryStorage, Subscription};
use super::ignore::IgnoreMatcher;
use super::watch::{WatchConfig, WatchRuntime};
use crate::config::{CanopyConfig, WorkspaceConfig};
use crate::error::{ApiError, StorageError};
use crate::tree::path::{is_within, normalize};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Storage collaborator reading the local filesystem
#[derive(Debug, Clone)]
pub struct LocalStorage {
    workspace: WorkspaceConfig,
    watch: WatchConfig,
    ignore: IgnoreMatcher,
}

impl LocalStorage {
    pub fn new(workspace: WorkspaceConfig, watch: WatchConfig) -> Result<Self, ApiError> {
        let ignore = IgnoreMatcher::new(&workspace.ignore_patterns)
            .map_err(|e| ApiError::ConfigError(format!("Invalid ignore pattern: {}", e)))?;
        Ok(Self {
            workspace,
            watch,
            ignore,
        })
    }

    pub fn from_config(config: &CanopyConfig) -> Result<Self, ApiError> {
        Self::new(config.workspace.clone(), config.watch.clone())
    }

    /// Canonical absolute form of a workspace root, matching the paths the
    /// watcher reports.
    pub fn resolve_root(path: &Path) -> Result<PathBuf, StorageError> {
        let root = dunce::canonicalize(path)?;
        if !root.is_dir() {
            return Err(StorageError::NotADirectory(root));
        }
        Ok(root)
    }

    fn snapshot_blocking(&self, path: &Path, depth: usize) -> Result<Directory, StorageError> {
        snapshot(path, depth, self.workspace.follow_symlinks, &self.ignore)
    }
}

#[async_trait]
impl DirectoryStorage for LocalStorage {
    async fn first_load_directory_tree(&self, root: &Path) -> Result<Directory, StorageError> {
        let storage = self.clone();
        let root = Self::resolve_root(root)?;
        let depth = self.workspace.initial_depth.max(1);
        run_blocking(move || storage.snapshot_blocking(&root, depth)).await
    }

    async fn explore_directory(
        &self,
        root: &Path,
        relative: &Path,
    ) -> Result<Directory, StorageError> {
        let target = normalize(&root.join(relative));
        if !is_within(root, &target) {
            return Err(StorageError::OutsideRoot {
                root: root.to_path_buf(),
                path: target,
            });
        }
        let storage = self.clone();
        run_blocking(move || storage.snapshot_blocking(&target, 1)).await
    }

    async fn subscribe_directory_tree(&self, root: &Path) -> Result<Subscription, StorageError> {
        let root = Self::resolve_root(root)?;
        WatchRuntime::spawn(&root, self.watch.clone(), self.ignore.clone())
    }
}

async fn run_blocking<F, T>(work: F) -> Result<T, StorageError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        StorageError::IoError(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Filesystem task failed: {}", e),
        ))
    })?
}

/// Walk `root` up to `depth` levels. Directories on the depth boundary are
/// returned without `children` so they convert to unexplored nodes.
pub(crate) fn snapshot(
    root: &Path,
    depth: usize,
    follow_symlinks: bool,
    ignore: &IgnoreMatcher,
) -> Result<Directory, StorageError> {
    let metadata = std::fs::metadata(root)?;
    if !metadata.is_dir() {
        return Err(StorageError::NotADirectory(root.to_path_buf()));
    }

    let mut listed: HashMap<PathBuf, Vec<(PathBuf, bool, usize)>> = HashMap::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(depth)
        .follow_links(follow_symlinks)
        .into_iter()
        .filter_entry(|entry| !ignore.is_ignored(entry.path()));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        let Some(parent) = entry.path().parent() else {
            continue;
        };
        listed.entry(parent.to_path_buf()).or_default().push((
            entry.path().to_path_buf(),
            entry.file_type().is_dir(),
            entry.depth(),
        ));
    }

    let node_count: usize = listed.values().map(Vec::len).sum();
    debug!(root = %root.display(), depth, node_count, "Directory snapshot collected");
    Ok(assemble(root.to_path_buf(), true, 0, depth, &mut listed))
}

fn assemble(
    path: PathBuf,
    is_directory: bool,
    level: usize,
    depth: usize,
    listed: &mut HashMap<PathBuf, Vec<(PathBuf, bool, usize)>>,
) -> Directory {
    if !is_directory {
        return Directory::file(path);
    }
    if level >= depth {
        return Directory::unexplored(path);
    }
    let entries = listed.remove(&path).unwrap_or_default();
    let children = entries
        .into_iter()
        .map(|(child, is_dir, child_level)| assemble(child, is_dir, child_level, depth, listed))
        .collect();
    Directory::listing(path, children)
}
