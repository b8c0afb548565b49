//! Workspace file source: `<root>/.canopy.toml`

use crate::config::paths::WORKSPACE_CONFIG_FILE;
use config::builder::DefaultState;
use config::{ConfigBuilder, File};
use std::path::Path;

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> ConfigBuilder<DefaultState> {
    builder.add_source(File::from(workspace_root.join(WORKSPACE_CONFIG_FILE)).required(false))
}
