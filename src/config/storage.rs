//! StorageConfig: where records and content live.

use crate::config::xdg;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_records_path() -> PathBuf {
    PathBuf::from("records")
}

fn default_content_root() -> PathBuf {
    PathBuf::from("content")
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base directory; defaults to `$XDG_DATA_HOME/bms`
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Sled database directory (relative to `data_dir`)
    #[serde(default = "default_records_path")]
    pub records_path: PathBuf,

    /// Content store root (relative to `data_dir`)
    #[serde(default = "default_content_root")]
    pub content_root: PathBuf,
}

/// Resolved on-disk locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub records: PathBuf,
    pub content: PathBuf,
}

impl StorageConfig {
    /// Resolve against `data_dir`, or the platform data directory when unset.
    /// Absolute paths are kept as given.
    pub fn resolve_paths(&self) -> Result<StoragePaths, ApiError> {
        let base = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => xdg::data_dir()?,
        };
        Ok(self.resolve_under(&base))
    }

    pub fn resolve_under(&self, base: &Path) -> StoragePaths {
        StoragePaths {
            records: base.join(&self.records_path),
            content: base.join(&self.content_root),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            records_path: default_records_path(),
            content_root: default_content_root(),
        }
    }
}
