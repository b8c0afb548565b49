//! Canopy: Live Workspace Directory Trees
//!
//! Keeps an in-memory tree of a workspace consistent with batched filesystem
//! change notifications, expanding directories lazily on demand.

pub mod config;
pub mod error;
pub mod logging;
pub mod storage;
pub mod tooling;
pub mod tree;
pub mod workspace;
