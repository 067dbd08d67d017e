//! MergeService: orchestrates sources, applies merge policy, deserializes to BmsConfig.

use crate::config::sources::{environment, global_file};
use crate::config::BmsConfig;
use config::{ConfigError, File};
use std::path::Path;

use super::policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Precedence: defaults (lowest) -> global file -> explicit file -> environment (highest).
    pub fn load(explicit: Option<&Path>) -> Result<BmsConfig, ConfigError> {
        let builder = policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = match explicit {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder,
        };
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }
}
