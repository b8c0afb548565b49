//! ConfigLoader facade delegating to the merge service.

use super::merge::MergeService;
use super::CanopyConfig;
use crate::error::ApiError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace from files and environment.
    pub fn load(workspace_root: &Path) -> Result<CanopyConfig, ApiError> {
        Ok(MergeService::load(workspace_root)?)
    }

    /// Load configuration from a specific file, with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<CanopyConfig, ApiError> {
        Ok(MergeService::load_from_file(path)?)
    }

    /// Create default configuration.
    pub fn default() -> CanopyConfig {
        CanopyConfig::default()
    }
}
