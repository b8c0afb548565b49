//! Owner of the active workspace session.

use crate::error::ApiError;
use crate::storage::DirectoryStorage;
use crate::workspace::session::WorkspaceSession;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Holds at most one live session. Opening another root first closes the
/// current session and waits for its subscription to be unregistered, so a
/// discarded root can never feed the new tree.
pub struct WorkspaceHost {
    storage: Arc<dyn DirectoryStorage>,
    session: Option<WorkspaceSession>,
}

impl WorkspaceHost {
    pub fn new(storage: Arc<dyn DirectoryStorage>) -> Self {
        Self {
            storage,
            session: None,
        }
    }

    /// Switch to `root`. On failure no session is active.
    pub async fn open(&mut self, root: impl Into<PathBuf>) -> Result<&WorkspaceSession, ApiError> {
        let root = root.into();
        self.close().await;
        let session = WorkspaceSession::open(Arc::clone(&self.storage), root).await?;
        Ok(self.session.insert(session))
    }

    pub fn session(&self) -> Option<&WorkspaceSession> {
        self.session.as_ref()
    }

    pub async fn close(&mut self) {
        if let Some(session) = self.session.take() {
            info!(root = %session.root().display(), "Closing workspace");
            session.close().await;
        }
    }
}

impl std::fmt::Debug for WorkspaceHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceHost")
            .field("session", &self.session)
            .finish()
    }
}
