//! Node lookup and in-place update by path.
//!
//! Ids are absolute paths, so the search only descends into children whose
//! id is an ancestor of (or equal to) the target. Updates are copy-on-write:
//! `Arc::make_mut` clones exactly the nodes on the root-to-target chain when
//! they are shared with an earlier snapshot, and every other subtree keeps
//! its reference.

use crate::tree::node::{NodeRef, TreeNode};
use crate::tree::path::is_within;
use std::path::Path;
use std::sync::Arc;

/// Child indices leading from `root` to the node with id `target`.
pub fn index_path(root: &TreeNode, target: &Path) -> Option<Vec<usize>> {
    if root.id == target {
        return Some(Vec::new());
    }
    if !is_within(&root.id, target) {
        return None;
    }
    for (index, child) in root.children().iter().enumerate() {
        if !is_within(&child.id, target) {
            continue;
        }
        if let Some(mut rest) = index_path(child, target) {
            rest.insert(0, index);
            return Some(rest);
        }
    }
    None
}

/// Find the node with id `target`.
pub fn find_node<'a>(root: &'a NodeRef, target: &Path) -> Option<&'a NodeRef> {
    let indices = index_path(root, target)?;
    find_by_index_path(root, &indices)
}

/// Resolve a UI index path (`[]` is the root) to a node.
pub fn find_by_index_path<'a>(root: &'a NodeRef, indices: &[usize]) -> Option<&'a NodeRef> {
    let mut current = root;
    for &index in indices {
        current = current.children().get(index)?;
    }
    Some(current)
}

/// Find the node with id `target` and hand it to `update` with exclusive access.
///
/// Returns `false` without calling `update` when the target is not in the tree.
/// Nodes on the path to the target are unshared from any other snapshot first.
pub fn find_and_update<F>(root: &mut NodeRef, target: &Path, update: F) -> bool
where
    F: FnOnce(&mut TreeNode),
{
    let Some(indices) = index_path(root, target) else {
        return false;
    };

    let mut current: &mut TreeNode = Arc::make_mut(root);
    for index in indices {
        let Some(state) = current.directory_state_mut() else {
            return false;
        };
        let Some(child) = state.children.get_mut(index) else {
            return false;
        };
        current = Arc::make_mut(child);
    }
    update(current);
    true
}
