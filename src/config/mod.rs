//! Configuration
//!
//! Layered with the `config` crate: built-in defaults, then the global file
//! (`$XDG_CONFIG_HOME/bms/config.toml`), then an explicit file, then
//! `BMS__*` environment variables.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;
pub mod storage;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;
pub use storage::{StorageConfig, StoragePaths};

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::types::Id;
use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BmsConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

/// Which tree a session operates on, and as whom.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Root folder identifier
    #[serde(default)]
    pub root: Option<Id>,

    /// Owning user identifier
    #[serde(default)]
    pub owner: Option<Id>,
}

impl SessionConfig {
    pub fn require_root(&self) -> Result<Id, ApiError> {
        self.root.ok_or_else(|| {
            ApiError::ConfigError(
                "No session root configured (set session.root, BMS__SESSION__ROOT, or --root)"
                    .to_string(),
            )
        })
    }

    pub fn require_owner(&self) -> Result<Id, ApiError> {
        self.owner.ok_or_else(|| {
            ApiError::ConfigError(
                "No session owner configured (set session.owner, BMS__SESSION__OWNER, or --owner)"
                    .to_string(),
            )
        })
    }
}
