//! Environment variable source: BMS__* prefix with __ separator

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment};

pub const ENV_PREFIX: &str = "BMS";

/// Add environment variable overlay to builder.
/// `BMS__STORAGE__DATA_DIR=/srv/bms` sets `storage.data_dir`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    ))
}
