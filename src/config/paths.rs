//! XDG Base Directory lookups for configuration files.

use std::path::PathBuf;

/// Name of the per-workspace configuration file
pub const WORKSPACE_CONFIG_FILE: &str = ".canopy.toml";

/// Get XDG config home directory
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise defaults to `$HOME/.config`
pub fn config_home() -> Option<PathBuf> {
    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg_config_home.is_empty() {
            return Some(PathBuf::from(xdg_config_home));
        }
    }

    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config"))
}

/// `$XDG_CONFIG_HOME/canopy/config.toml`
pub fn global_config_path() -> Option<PathBuf> {
    config_home().map(|home| home.join("canopy").join("config.toml"))
}
