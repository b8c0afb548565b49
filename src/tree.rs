//! Workspace tree model
//!
//! In-memory hierarchy of a workspace: node types, sibling ordering, lookup,
//! reconciliation of change batches, and lazy exploration. Snapshots are
//! immutable once published; every mutation goes through
//! [`locator::find_and_update`] on a working copy.

pub mod event;
pub mod explore;
pub mod locator;
pub mod node;
pub mod order;
pub mod path;
pub mod reconcile;

pub use event::{DirectoryTreeEvent, EventBatch, EventKind};
pub use explore::{graft_listing, toggle_open, GraftOutcome};
pub use locator::{find_and_update, find_by_index_path, find_node};
pub use node::{DirectoryState, NodeKind, NodeRef, TreeNode};
pub use reconcile::{
    apply_batch, reconcile, ReconcileReport, Reconciliation, SkipReason, UpdateObservation,
};
