//! Storage collaborator
//!
//! The contract a workspace session consumes (snapshots, one-level listings,
//! change subscriptions) and a local-disk implementation of it.

pub mod contract;
pub mod ignore;
pub mod local;
pub mod watch;

pub use contract::{Directory, DirectoryStorage, Subscription};
pub use ignore::IgnoreMatcher;
pub use local::LocalStorage;
pub use watch::{WatchConfig, WatchRuntime};
