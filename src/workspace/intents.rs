//! Intents exchanged with the presentation layer.

use crate::tree::TreeNode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Kind of entry a click landed on, as the UI saw it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// Expand/click request. The flags are the UI's view of the node at click time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickIntent {
    pub path: PathBuf,
    pub kind: EntryKind,
    #[serde(default)]
    pub explored: bool,
    #[serde(default)]
    pub is_open: bool,
}

impl ClickIntent {
    /// Intent for clicking `node` as it appears in a snapshot.
    pub fn for_node(node: &TreeNode) -> Self {
        Self {
            path: node.id.clone(),
            kind: if node.is_directory() {
                EntryKind::Directory
            } else {
                EntryKind::File
            },
            explored: node.is_explored(),
            is_open: node.is_open(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ClickOutcome {
    /// A file was clicked; its content collaborators should load it.
    OpenFile { path: PathBuf },
    /// An explored directory was opened or closed locally.
    Toggled { path: PathBuf, is_open: bool },
    /// An unexplored directory was fetched and grafted.
    Explored { path: PathBuf, child_count: usize },
    /// Stale or duplicate intent; nothing happened.
    Ignored,
}

/// Right-click on the tree in UI space. `tree_path` holds child indices from
/// the root (`[]` is the root itself).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMenuHit {
    pub x: f64,
    pub y: f64,
    pub tree_path: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MenuItemKind {
    FileTreeItemFile,
    FileTreeItemDirectory,
}

impl MenuItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuItemKind::FileTreeItemFile => "file-tree-item-file",
            MenuItemKind::FileTreeItemDirectory => "file-tree-item-directory",
        }
    }
}

impl fmt::Display for MenuItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the menu collaborator needs to render a context menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMenuRequest {
    pub x: f64,
    pub y: f64,
    pub item_kind: MenuItemKind,
    pub path: PathBuf,
}

impl ContextMenuRequest {
    pub fn for_node(hit: &ContextMenuHit, node: &TreeNode) -> Self {
        Self {
            x: hit.x,
            y: hit.y,
            item_kind: if node.is_directory() {
                MenuItemKind::FileTreeItemDirectory
            } else {
                MenuItemKind::FileTreeItemFile
            },
            path: node.id.clone(),
        }
    }
}
