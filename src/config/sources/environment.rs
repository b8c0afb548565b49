//! Environment variable source: CANOPY prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

/// Add environment variable overlay to builder.
/// `CANOPY__WATCH__DEBOUNCE_MS=200` sets `watch.debounce_ms`;
/// `CANOPY__WORKSPACE__IGNORE_PATTERNS` takes a comma-separated list.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("CANOPY")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("workspace.ignore_patterns"),
    )
}
