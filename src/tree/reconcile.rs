//! Incremental reconciliation of change batches into the workspace tree.
//!
//! A batch is applied event by event against one working copy of the root,
//! so later events see the effects of earlier ones. Every inconsistency
//! (unknown parent, duplicate create, delete of an absent entry) degrades to
//! a logged skip; reconciliation itself never fails.

use crate::tree::event::{DirectoryTreeEvent, EventKind};
use crate::tree::locator::{find_and_update, find_node};
use crate::tree::node::{InsertOutcome, NodeRef, TreeNode};
use crate::tree::path::parent_path;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Why an event left the tree untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The path has no parent component
    NoParent,
    /// The parent is not part of the loaded tree
    ParentNotFound,
    /// The parent is a file
    ParentIsFile,
    /// The parent directory has not been explored yet
    ParentUnexplored,
    /// A sibling with the same id already exists
    DuplicateCreate,
    /// Nothing to delete at that path
    DeleteTargetAbsent,
}

/// What an Update event found at its path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateObservation {
    UnknownPath,
    KnownFile,
    KnownDirectory,
}

/// Per-batch accounting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: usize,
    pub deleted: usize,
    pub skipped: Vec<(PathBuf, SkipReason)>,
    pub updates: Vec<(PathBuf, UpdateObservation)>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.created == 0 && self.deleted == 0
    }
}

/// Result of reconciling one batch
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// Same reference as the input when nothing changed
    pub root: NodeRef,
    pub changed: bool,
    pub report: ReconcileReport,
}

/// Apply `events` to `root`.
///
/// Returns the input reference when no event changed the tree, otherwise a new
/// root sharing every subtree the batch did not touch.
pub fn reconcile(root: &NodeRef, events: &[DirectoryTreeEvent]) -> Reconciliation {
    let mut working = Arc::clone(root);
    let mut report = ReconcileReport::default();

    for event in events {
        match event.kind {
            EventKind::Create => apply_create(&mut working, event, &mut report),
            EventKind::Update => observe_update(&working, event, &mut report),
            EventKind::Delete => apply_delete(&mut working, event, &mut report),
        }
    }

    let changed = !report.is_empty();
    Reconciliation {
        root: if changed { working } else { Arc::clone(root) },
        changed,
        report,
    }
}

/// Reconcile against a tree that may not be loaded yet.
///
/// With no tree there is nothing to reconcile and `None` is returned.
pub fn apply_batch(root: Option<&NodeRef>, events: &[DirectoryTreeEvent]) -> Option<NodeRef> {
    match root {
        Some(root) => Some(reconcile(root, events).root),
        None => {
            debug!(event_count = events.len(), "Tree not loaded, dropping batch");
            None
        }
    }
}

fn skip(report: &mut ReconcileReport, event: &DirectoryTreeEvent, reason: SkipReason) {
    warn!(path = %event.path.display(), kind = ?event.kind, reason = ?reason, "Skipping tree event");
    report.skipped.push((event.path.clone(), reason));
}

fn apply_create(working: &mut NodeRef, event: &DirectoryTreeEvent, report: &mut ReconcileReport) {
    let Some(parent) = parent_path(&event.path) else {
        skip(report, event, SkipReason::NoParent);
        return;
    };
    // Skips are decided read-only; only a real insert unshares the parent chain.
    if let Err(reason) = check_create(working, &parent, &event.path) {
        skip(report, event, reason);
        return;
    }

    let mut outcome = InsertOutcome::NotADirectory;
    let found = find_and_update(working, &parent, |node| {
        outcome = node.insert_child(TreeNode::entry(event.path.clone(), event.is_directory));
    });

    match (found, outcome) {
        (false, _) => skip(report, event, SkipReason::ParentNotFound),
        (true, InsertOutcome::Duplicate) => skip(report, event, SkipReason::DuplicateCreate),
        (true, InsertOutcome::NotADirectory) => skip(report, event, SkipReason::ParentIsFile),
        (true, InsertOutcome::Inserted) => {
            debug!(path = %event.path.display(), is_directory = event.is_directory, "Created tree node");
            report.created += 1;
        }
    }
}

fn check_create(working: &NodeRef, parent: &Path, path: &Path) -> Result<(), SkipReason> {
    let node = find_node(working, parent).ok_or(SkipReason::ParentNotFound)?;
    if !node.is_directory() {
        return Err(SkipReason::ParentIsFile);
    }
    if !node.is_explored() {
        return Err(SkipReason::ParentUnexplored);
    }
    if node.children().iter().any(|child| child.id == path) {
        return Err(SkipReason::DuplicateCreate);
    }
    Ok(())
}

fn observe_update(working: &NodeRef, event: &DirectoryTreeEvent, report: &mut ReconcileReport) {
    let observation = match find_node(working, &event.path) {
        None => UpdateObservation::UnknownPath,
        Some(node) if node.is_directory() => UpdateObservation::KnownDirectory,
        Some(_) => UpdateObservation::KnownFile,
    };
    debug!(path = %event.path.display(), observation = ?observation, "Update leaves tree shape unchanged");
    report.updates.push((event.path.clone(), observation));
}

fn apply_delete(working: &mut NodeRef, event: &DirectoryTreeEvent, report: &mut ReconcileReport) {
    let Some(parent) = parent_path(&event.path) else {
        skip(report, event, SkipReason::NoParent);
        return;
    };
    let Some(parent_node) = find_node(working, &parent) else {
        skip(report, event, SkipReason::ParentNotFound);
        return;
    };
    if !parent_node.children().iter().any(|child| child.id == event.path) {
        skip(report, event, SkipReason::DeleteTargetAbsent);
        return;
    }

    let mut removed = false;
    let found = find_and_update(working, &parent, |node| {
        removed = node.remove_child(&event.path);
    });

    if !found {
        skip(report, event, SkipReason::ParentNotFound);
    } else if !removed {
        skip(report, event, SkipReason::DeleteTargetAbsent);
    } else {
        debug!(path = %event.path.display(), "Deleted tree node");
        report.deleted += 1;
    }
}
