//! Tree node types and construction from storage snapshots.

use crate::storage::Directory;
use crate::tree::order::compare_entries;
use crate::tree::path::basename;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared handle to a node. Snapshots share unmodified subtrees through it.
pub type NodeRef = Arc<TreeNode>;

/// Expansion state of a directory node
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryState {
    /// Children sorted directories-first, then by name. Empty until explored.
    pub children: Vec<NodeRef>,
    /// True once the children have been fetched from storage
    pub explored: bool,
    /// UI expansion flag
    pub is_open: bool,
}

/// Node kind, fixed at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory(DirectoryState),
}

/// One filesystem entry in the workspace tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    /// Absolute path; unique within a tree
    pub id: PathBuf,
    /// Basename of `id`
    pub name: String,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl TreeNode {
    /// New file node
    pub fn file(id: impl Into<PathBuf>) -> Self {
        let id = id.into();
        Self {
            name: basename(&id),
            id,
            kind: NodeKind::File,
        }
    }

    /// New unexplored, closed directory node
    pub fn directory(id: impl Into<PathBuf>) -> Self {
        let id = id.into();
        Self {
            name: basename(&id),
            id,
            kind: NodeKind::Directory(DirectoryState::default()),
        }
    }

    /// New file or unexplored directory, the construction rule shared by
    /// Create events and exploration listings.
    pub fn entry(id: impl Into<PathBuf>, is_directory: bool) -> Self {
        if is_directory {
            Self::directory(id)
        } else {
            Self::file(id)
        }
    }

    /// Build a node from a storage snapshot.
    ///
    /// Directories carrying `children` become explored; directories without
    /// them stay unexplored. Every node starts closed.
    pub fn from_directory(directory: Directory) -> Self {
        if !directory.is_directory {
            return Self::file(directory.path);
        }
        let mut node = Self::directory(directory.path);
        if let Some(children) = directory.children {
            let children = children
                .into_iter()
                .map(|child| Arc::new(Self::from_directory(child)))
                .collect();
            if let NodeKind::Directory(state) = &mut node.kind {
                state.children = normalize_children(children);
                state.explored = true;
            }
        }
        node
    }

    /// Build the root of an initial load. The root is shown open.
    pub fn root_from_directory(directory: Directory) -> Self {
        let mut root = Self::from_directory(directory);
        if let NodeKind::Directory(state) = &mut root.kind {
            state.is_open = true;
        }
        root
    }

    /// Convert back to the storage snapshot shape.
    pub fn to_directory(&self) -> Directory {
        match &self.kind {
            NodeKind::File => Directory::file(self.id.clone()),
            NodeKind::Directory(state) if state.explored => Directory {
                path: self.id.clone(),
                is_directory: true,
                children: Some(state.children.iter().map(|c| c.to_directory()).collect()),
            },
            NodeKind::Directory(_) => Directory::unexplored(self.id.clone()),
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, NodeKind::Directory(_))
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File)
    }

    pub fn directory_state(&self) -> Option<&DirectoryState> {
        match &self.kind {
            NodeKind::Directory(state) => Some(state),
            NodeKind::File => None,
        }
    }

    pub fn directory_state_mut(&mut self) -> Option<&mut DirectoryState> {
        match &mut self.kind {
            NodeKind::Directory(state) => Some(state),
            NodeKind::File => None,
        }
    }

    /// Children of a directory; empty for files.
    pub fn children(&self) -> &[NodeRef] {
        self.directory_state()
            .map(|state| state.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_explored(&self) -> bool {
        self.directory_state().map(|s| s.explored).unwrap_or(false)
    }

    pub fn is_open(&self) -> bool {
        self.directory_state().map(|s| s.is_open).unwrap_or(false)
    }

    pub fn child(&self, id: &Path) -> Option<&NodeRef> {
        self.children().iter().find(|child| child.id == id)
    }

    /// Insert a child and restore sibling order.
    ///
    /// Returns the outcome without touching the node when the insert is not
    /// possible: files have no children and ids are unique among siblings.
    pub fn insert_child(&mut self, child: TreeNode) -> InsertOutcome {
        let Some(state) = self.directory_state_mut() else {
            return InsertOutcome::NotADirectory;
        };
        if state.children.iter().any(|existing| existing.id == child.id) {
            return InsertOutcome::Duplicate;
        }
        state.children.push(Arc::new(child));
        state.children.sort_by(|a, b| compare_nodes(a, b));
        InsertOutcome::Inserted
    }

    /// Remove the child with the given id. Returns whether one was removed.
    pub fn remove_child(&mut self, id: &Path) -> bool {
        let Some(state) = self.directory_state_mut() else {
            return false;
        };
        let before = state.children.len();
        state.children.retain(|child| child.id != id);
        state.children.len() != before
    }

    /// Replace the children with a freshly fetched listing and mark the
    /// directory explored and open.
    pub fn replace_children(&mut self, children: Vec<TreeNode>) -> bool {
        let Some(state) = self.directory_state_mut() else {
            return false;
        };
        state.children = normalize_children(children.into_iter().map(Arc::new).collect());
        state.explored = true;
        state.is_open = true;
        true
    }

    /// Total number of nodes in this subtree, self included.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|child| child.node_count())
            .sum::<usize>()
    }
}

/// Result of [`TreeNode::insert_child`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Duplicate,
    NotADirectory,
}

/// Sibling comparator over nodes.
pub fn compare_nodes(a: &TreeNode, b: &TreeNode) -> std::cmp::Ordering {
    compare_entries(a.is_directory(), &a.name, b.is_directory(), &b.name)
}

fn normalize_children(mut children: Vec<NodeRef>) -> Vec<NodeRef> {
    children.sort_by(|a, b| compare_nodes(a, b));
    let mut seen = std::collections::HashSet::new();
    children.retain(|child| seen.insert(child.id.clone()));
    children
}
