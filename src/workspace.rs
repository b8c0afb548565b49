//! Workspace sessions
//!
//! Lifetime-scoped services built on the tree model: the subscription
//! manager, the single-writer session actor, the host that switches roots,
//! and the intents exchanged with the presentation layer.

pub mod format;
pub mod host;
pub mod intents;
pub mod session;
pub mod subscription;

pub use format::{format_tree_json, format_tree_text};
pub use host::WorkspaceHost;
pub use intents::{
    ClickIntent, ClickOutcome, ContextMenuHit, ContextMenuRequest, EntryKind, MenuItemKind,
};
pub use session::WorkspaceSession;
pub use subscription::SubscriptionManager;
