//! Assets
//!
//! The two kinds of record in the store: folders and files. Dispatch on kind
//! is a match on [`Asset`], never a dynamic type test.

pub mod file;
pub mod folder;
pub mod handle;

use crate::error::{FsError, StorageError};
use crate::metadata::{Metadata, MODE_DIR};
use crate::store::Storable;
use crate::types::Id;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub use file::{File, FileHandle};
pub use folder::{Folder, FolderEntry};
pub use handle::{FolderHandle, OpenAsset};

/// A hydrated file or folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset {
    Folder(Folder),
    File(File),
}

impl Asset {
    pub fn metadata(&self) -> &Metadata {
        match self {
            Asset::Folder(folder) => &folder.metadata,
            Asset::File(file) => &file.metadata,
        }
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        match self {
            Asset::Folder(folder) => &mut folder.metadata,
            Asset::File(file) => &mut file.metadata,
        }
    }

    pub fn id(&self) -> Id {
        self.metadata().id
    }

    pub fn name(&self) -> &str {
        &self.metadata().name
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Asset::Folder(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Asset::Folder(_) => "folder",
            Asset::File(_) => "file",
        }
    }

    /// The entry a parent folder holds for this asset.
    pub fn entry(&self) -> FolderEntry {
        FolderEntry::new(self.id(), self.name(), self.is_folder())
    }

    pub fn into_folder(self, op: &'static str) -> Result<Folder, FsError> {
        match self {
            Asset::Folder(folder) => Ok(folder),
            Asset::File(file) => Err(FsError::not_folder(op, file.metadata.name)),
        }
    }
}

impl Storable for Asset {
    fn id(&self) -> Id {
        Asset::id(self)
    }

    fn encode(&self) -> Result<Vec<u8>, StorageError> {
        match self {
            Asset::Folder(folder) => folder.encode(),
            Asset::File(file) => file.encode(),
        }
    }

    /// Decode either kind, choosing by the directory bit of the stored mode.
    fn decode(bytes: &[u8]) -> Result<Self, StorageError> {
        if Metadata::peek_mode(bytes)? & MODE_DIR != 0 {
            Folder::decode(bytes).map(Asset::Folder)
        } else {
            File::decode(bytes).map(Asset::File)
        }
    }
}

impl From<Folder> for Asset {
    fn from(folder: Folder) -> Self {
        Asset::Folder(folder)
    }
}

impl From<File> for Asset {
    fn from(file: File) -> Self {
        Asset::File(file)
    }
}

/// Descriptive attributes of an asset, as reported by stat and readdir.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetInfo {
    pub id: Id,
    pub owner: Id,
    pub name: String,
    pub mode: u32,
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub is_dir: bool,
}

impl AssetInfo {
    pub fn for_folder(folder: &Folder) -> Self {
        Self {
            id: folder.metadata.id,
            owner: folder.metadata.owner,
            name: folder.metadata.name.clone(),
            mode: folder.metadata.mode,
            size: 0,
            modified: folder.metadata.modified(),
            is_dir: true,
        }
    }

    /// `ls -l` style mode string, e.g. `drwxr-x---`.
    pub fn mode_string(&self) -> String {
        let mut s = String::with_capacity(10);
        s.push(if self.is_dir { 'd' } else { '-' });
        for shift in [6u32, 3, 0] {
            let bits = (self.mode >> shift) & 0o7;
            s.push(if bits & 0o4 != 0 { 'r' } else { '-' });
            s.push(if bits & 0o2 != 0 { 'w' } else { '-' });
            s.push(if bits & 0o1 != 0 { 'x' } else { '-' });
        }
        s
    }
}

/// An entry readdir could not describe.
#[derive(Debug)]
pub struct SkippedEntry {
    pub name: String,
    pub error: FsError,
}

/// Best-effort directory listing.
#[derive(Debug, Default)]
pub struct DirListing {
    pub entries: Vec<AssetInfo>,
    pub skipped: Vec<SkippedEntry>,
}

impl DirListing {
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn first_error(&self) -> Option<&FsError> {
        self.skipped.first().map(|s| &s.error)
    }

    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_dispatches_on_mode() {
        let folder = Folder::new("dir", 0o755);
        let file = File::new("file", 0o644);
        assert!(Asset::decode(&folder.encode().unwrap()).unwrap().is_folder());
        assert!(!Asset::decode(&file.encode().unwrap()).unwrap().is_folder());
    }

    #[test]
    fn test_entry_mirrors_asset() {
        let asset = Asset::from(Folder::new("dir", 0o755));
        let entry = asset.entry();
        assert_eq!(entry.id, asset.id());
        assert_eq!(entry.name, "dir");
        assert!(entry.is_folder);
    }

    #[test]
    fn test_into_folder_rejects_files() {
        let asset = Asset::from(File::new("f", 0o644));
        assert!(asset.into_folder("readdir").unwrap_err().is_not_folder());
    }

    #[test]
    fn test_mode_string() {
        let info = AssetInfo::for_folder(&Folder::new("d", 0o750));
        assert_eq!(info.mode_string(), "drwxr-x---");
    }
}
