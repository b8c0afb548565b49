//! Global file source: `$XDG_CONFIG_HOME/canopy/config.toml`

use crate::config::paths::global_config_path;
use config::builder::DefaultState;
use config::{ConfigBuilder, File};

/// Add the global config file when the config home can be resolved.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    match global_config_path() {
        Some(path) => builder.add_source(File::from(path).required(false)),
        None => builder,
    }
}
