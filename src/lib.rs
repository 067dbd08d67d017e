//! BMS: Identifier-Addressed File Store
//!
//! A hierarchical file store whose folders and files are records in a flat
//! key/value store, addressed by opaque 128-bit identifiers. File content
//! lives in a separate byte-stream backend at a path derived from the
//! content identifier.

pub mod addressing;
pub mod asset;
pub(crate) mod codec;
pub mod concurrency;
pub mod config;
pub mod content;
pub mod error;
pub mod filesystem;
pub mod logging;
pub mod metadata;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;

pub use asset::{Asset, AssetInfo, DirListing, File, Folder, FolderEntry, OpenAsset};
pub use content::{ContentStore, LocalContentStore, OpenFlags};
pub use error::{ApiError, FsError, StorageError};
pub use filesystem::{FileSystem, FolderFileSystem};
pub use store::{MemoryRecordStore, RecordStore, SledRecordStore};
pub use tree::FolderTree;
pub use types::Id;
