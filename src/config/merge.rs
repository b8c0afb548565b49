//! MergeService: orchestrates sources, applies precedence, deserializes to CanopyConfig.

use super::sources::{environment, global_file, workspace_file};
use super::CanopyConfig;
use config::{Config, ConfigError, File};
use std::path::Path;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from workspace and standard sources.
    /// Missing keys fall back to the serde defaults on each section.
    /// Precedence: defaults (lowest) -> global file -> workspace file -> environment (highest).
    pub fn load(workspace_root: &Path) -> Result<CanopyConfig, ConfigError> {
        let builder = Config::builder();
        let builder = global_file::add_to_builder(builder);
        let builder = workspace_file::add_to_builder(builder, workspace_root);
        let builder = environment::add_to_builder(builder);

        builder.build()?.try_deserialize()
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<CanopyConfig, ConfigError> {
        let builder = Config::builder();
        let builder = builder.add_source(File::from(path).required(true));
        let builder = environment::add_to_builder(builder);

        builder.build()?.try_deserialize()
    }
}
