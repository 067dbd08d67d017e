//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::BmsConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the global file and environment.
    pub fn load() -> Result<BmsConfig, ConfigError> {
        MergeService::load(None)
    }

    /// Load with `path` layered over the global file.
    pub fn load_from_file(path: &Path) -> Result<BmsConfig, ConfigError> {
        MergeService::load(Some(path))
    }

    /// Create default configuration.
    pub fn default() -> BmsConfig {
        BmsConfig::default()
    }
}
