//! Splicing lazily fetched listings into the tree, and local open/close toggles.

use crate::storage::Directory;
use crate::tree::locator::{find_and_update, find_node};
use crate::tree::node::{NodeRef, TreeNode};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of grafting a listing onto a directory node
#[derive(Debug, Clone)]
pub enum GraftOutcome {
    /// New root with the directory explored, open and populated
    Grafted(NodeRef),
    /// The target disappeared while the listing was being fetched
    NodeMissing,
    NotADirectory,
    /// Someone else explored it first; the tree is left alone
    AlreadyExplored,
}

/// One level of nodes built from a listing: files and unexplored directories.
pub fn listing_children(listing: Directory) -> Vec<TreeNode> {
    listing
        .children
        .unwrap_or_default()
        .into_iter()
        .map(|entry| TreeNode::entry(entry.path, entry.is_directory))
        .collect()
}

/// Replace the children of the unexplored directory `target` with `listing`.
pub fn graft_listing(root: &NodeRef, target: &Path, listing: Directory) -> GraftOutcome {
    match find_node(root, target) {
        None => return GraftOutcome::NodeMissing,
        Some(node) if !node.is_directory() => return GraftOutcome::NotADirectory,
        Some(node) if node.is_explored() => return GraftOutcome::AlreadyExplored,
        Some(_) => {}
    }
    if listing.path != target {
        warn!(
            target = %target.display(),
            listing = %listing.path.display(),
            "Listing path differs from exploration target"
        );
    }

    let children = listing_children(listing);
    let child_count = children.len();
    let mut working = Arc::clone(root);
    find_and_update(&mut working, target, |node| {
        node.replace_children(children);
    });
    debug!(path = %target.display(), child_count, "Grafted directory listing");
    GraftOutcome::Grafted(working)
}

/// Flip the open flag of an explored directory without touching storage.
///
/// Returns the new root and the new flag, or `None` when `target` is not an
/// explored directory in this tree.
pub fn toggle_open(root: &NodeRef, target: &Path) -> Option<(NodeRef, bool)> {
    let node = find_node(root, target)?;
    if !node.is_explored() {
        return None;
    }
    let mut working = Arc::clone(root);
    let mut is_open = false;
    find_and_update(&mut working, target, |node| {
        if let Some(state) = node.directory_state_mut() {
            state.is_open = !state.is_open;
            is_open = state.is_open;
        }
    });
    Some((working, is_open))
}
