//! Built-in defaults, the lowest-precedence layer.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// A builder seeded with every default the deserializer does not supply itself.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("logging.level", "warn")?
        .set_default("logging.output", "stderr")
}
