//! Configuration
//!
//! Layered configuration for a canopy workspace. Sources, lowest precedence
//! first: built-in defaults, the global file
//! (`$XDG_CONFIG_HOME/canopy/config.toml`), the workspace file
//! (`<root>/.canopy.toml`), and `CANOPY__SECTION__KEY` environment variables.

mod facade;
mod merge;
mod paths;
mod sources;

pub use facade::ConfigLoader;
pub use paths::{config_home, global_config_path, WORKSPACE_CONFIG_FILE};

use crate::logging::LoggingConfig;
use crate::storage::WatchConfig;
use serde::{Deserialize, Serialize};

fn default_initial_depth() -> usize {
    1
}

fn default_ignore_patterns() -> Vec<String> {
    vec![
        "**/.git".to_string(),
        "**/.git/**".to_string(),
        "**/node_modules".to_string(),
        "**/node_modules/**".to_string(),
        "**/.DS_Store".to_string(),
        "**/*.swp".to_string(),
    ]
}

/// Workspace browsing settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Levels listed by the initial snapshot (at least 1)
    #[serde(default = "default_initial_depth")]
    pub initial_depth: usize,

    /// Follow symbolic links while walking
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Glob patterns hidden from the tree and the watcher
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            initial_depth: default_initial_depth(),
            follow_symlinks: false,
            ignore_patterns: default_ignore_patterns(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CanopyConfig {
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}
