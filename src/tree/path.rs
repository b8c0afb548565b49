//! Path decomposition helpers. Pure functions, no filesystem access.

use std::path::{Component, Path, PathBuf};

/// Parent directory of `path`, or `None` for a root or an empty path.
pub fn parent_path(path: &Path) -> Option<PathBuf> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Some(parent.to_path_buf()),
        _ => None,
    }
}

/// Final component of `path`. Falls back to the whole path when there is none (`/`).
pub fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// `path` expressed relative to `root`. The root itself maps to an empty path.
///
/// Returns `None` when `path` does not live under `root`.
pub fn relative_path(root: &Path, path: &Path) -> Option<PathBuf> {
    path.strip_prefix(root).ok().map(Path::to_path_buf)
}

/// Whether `path` equals `ancestor` or lies below it, compared component-wise.
pub fn is_within(ancestor: &Path, path: &Path) -> bool {
    path.starts_with(ancestor)
}

/// Lexically resolve `.` and `..` without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                } else if components.is_empty() {
                    components.push(component);
                }
            }
            _ => components.push(component),
        }
    }
    components.iter().collect()
}
