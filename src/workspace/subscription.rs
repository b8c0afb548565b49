//! Ownership of the single live change subscription of a session.

use crate::storage::Subscription;
use crate::tree::EventBatch;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Holds at most one subscription. Activating a new one unregisters the
/// previous subscription first, so batches for a discarded root are never
/// yielded again.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    active: Option<Subscription>,
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&mut self, subscription: Subscription) {
        self.unregister();
        info!(root = %subscription.root().display(), "Subscription activated");
        self.active = Some(subscription);
    }

    /// Unregister the active subscription, if any. Returns whether one existed.
    pub fn unregister(&mut self) -> bool {
        match self.active.take() {
            Some(mut subscription) => {
                subscription.unregister();
                true
            }
            None => false,
        }
    }

    pub fn active_root(&self) -> Option<&Path> {
        self.active.as_ref().map(|s| s.root())
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Next batch tagged with the root it was produced for.
    ///
    /// Pending forever while nothing is active. When the producer ends the
    /// stream the subscription is released and `None` is returned once.
    pub async fn next_batch(&mut self) -> Option<(PathBuf, EventBatch)> {
        let Some(subscription) = self.active.as_mut() else {
            return std::future::pending().await;
        };
        match subscription.next_batch().await {
            Some(batch) => Some((subscription.root().to_path_buf(), batch)),
            None => {
                warn!(root = %subscription.root().display(), "Change stream ended");
                self.unregister();
                None
            }
        }
    }
}
