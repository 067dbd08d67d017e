//! Error types for the store, the folder tree, and the tooling layer.

use crate::types::Id;
use thiserror::Error;

/// Codec and key/value store failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("record not found: {0}")]
    NotFound(Id),

    #[error("corrupt record: {0}")]
    CorruptRecord(String),

    #[error("name too long: {0} bytes (limit 65535)")]
    NameTooLong(usize),

    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("record {id} is a {found}, entry expected a {expected}")]
    KindMismatch {
        id: Id,
        expected: &'static str,
        found: &'static str,
    },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

/// Tree and filesystem failures, carrying the operation and path they occurred on.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("{op} {path}: no such file or folder")]
    NotExist { op: &'static str, path: String },

    #[error("{op} {path}: already exists")]
    AlreadyExists { op: &'static str, path: String },

    #[error("{op} {path}: asset is a folder")]
    IsFolder { op: &'static str, path: String },

    #[error("{op} {path}: asset is not a folder")]
    NotFolder { op: &'static str, path: String },

    #[error("{op} {path}: invalid path")]
    InvalidPath { op: &'static str, path: String },

    #[error("{op} {path}: {source}")]
    Storage {
        op: &'static str,
        path: String,
        #[source]
        source: StorageError,
    },

    #[error("{op} {path}: {source}")]
    Io {
        op: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl FsError {
    pub fn not_exist(op: &'static str, path: impl Into<String>) -> Self {
        FsError::NotExist {
            op,
            path: path.into(),
        }
    }

    pub fn already_exists(op: &'static str, path: impl Into<String>) -> Self {
        FsError::AlreadyExists {
            op,
            path: path.into(),
        }
    }

    pub fn is_folder(op: &'static str, path: impl Into<String>) -> Self {
        FsError::IsFolder {
            op,
            path: path.into(),
        }
    }

    pub fn not_folder(op: &'static str, path: impl Into<String>) -> Self {
        FsError::NotFolder {
            op,
            path: path.into(),
        }
    }

    pub fn invalid_path(op: &'static str, path: impl Into<String>) -> Self {
        FsError::InvalidPath {
            op,
            path: path.into(),
        }
    }

    pub fn storage(op: &'static str, path: impl Into<String>, source: StorageError) -> Self {
        FsError::Storage {
            op,
            path: path.into(),
            source,
        }
    }

    pub fn io(op: &'static str, path: impl Into<String>, source: std::io::Error) -> Self {
        FsError::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// Replace the path context, keeping the operation and the cause.
    pub fn with_path(self, new_path: impl Into<String>) -> Self {
        let new_path = new_path.into();
        match self {
            FsError::NotExist { op, .. } => FsError::NotExist { op, path: new_path },
            FsError::AlreadyExists { op, .. } => FsError::AlreadyExists { op, path: new_path },
            FsError::IsFolder { op, .. } => FsError::IsFolder { op, path: new_path },
            FsError::NotFolder { op, .. } => FsError::NotFolder { op, path: new_path },
            FsError::InvalidPath { op, .. } => FsError::InvalidPath { op, path: new_path },
            FsError::Storage { op, source, .. } => FsError::Storage {
                op,
                path: new_path,
                source,
            },
            FsError::Io { op, source, .. } => FsError::Io {
                op,
                path: new_path,
                source,
            },
        }
    }

    pub fn is_not_exist(&self) -> bool {
        matches!(self, FsError::NotExist { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, FsError::AlreadyExists { .. })
    }

    pub fn is_folder_error(&self) -> bool {
        matches!(self, FsError::IsFolder { .. })
    }

    pub fn is_not_folder(&self) -> bool {
        matches!(self, FsError::NotFolder { .. })
    }

    /// The underlying store error, if this failure came from the key/value layer.
    pub fn storage_source(&self) -> Option<&StorageError> {
        match self {
            FsError::Storage { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<FsError> for std::io::Error {
    fn from(err: FsError) -> Self {
        let kind = match &err {
            FsError::NotExist { .. } => std::io::ErrorKind::NotFound,
            FsError::AlreadyExists { .. } => std::io::ErrorKind::AlreadyExists,
            FsError::InvalidPath { .. } => std::io::ErrorKind::InvalidInput,
            _ => std::io::ErrorKind::Other,
        };
        std::io::Error::new(kind, err)
    }
}

/// Errors surfaced by configuration loading and the CLI.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to render output: {0}")]
    OutputError(String),

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_path_keeps_operation_and_kind() {
        let err = FsError::not_exist("find", "b").with_path("/a/b");
        match err {
            FsError::NotExist { op, path } => {
                assert_eq!(op, "find");
                assert_eq!(path, "/a/b");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn storage_source_is_exposed() {
        let id = Id::new();
        let err = FsError::storage("remove", "x", StorageError::NotFound(id));
        assert!(err.storage_source().unwrap().is_not_found());
        assert_eq!(err.to_string(), format!("remove x: record not found: {}", id));
    }

    #[test]
    fn io_error_kind_follows_fs_error() {
        let io: std::io::Error = FsError::already_exists("mkdir", "/a").into();
        assert_eq!(io.kind(), std::io::ErrorKind::AlreadyExists);
    }
}
