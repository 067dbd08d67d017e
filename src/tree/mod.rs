//! Folder Tree Engine
//!
//! Folders hold only identifiers and kind flags for their children; every
//! child is rehydrated from the record store on demand. Any operation that
//! changes a record holds that record's lock for the whole
//! load-mutate-persist cycle and writes the record back before returning.

mod mutation;
mod remove;

use crate::asset::{Asset, AssetInfo, DirListing, File, FileHandle, Folder, FolderEntry, SkippedEntry};
use crate::concurrency::AssetLockManager;
use crate::content::{ContentStore, OpenFlags};
use crate::error::{FsError, StorageError};
use crate::store::{RecordStore, RecordStoreExt, Storable};
use crate::types::Id;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

/// Handle over one record store and one content store.
///
/// Cheap to clone; clones share the same stores and lock table.
#[derive(Clone)]
pub struct FolderTree {
    records: Arc<dyn RecordStore>,
    content: Arc<dyn ContentStore>,
    locks: Arc<AssetLockManager>,
    /// Held around moves of a folder between two parents, outside the id locks.
    folder_moves: Arc<Mutex<()>>,
}

impl FolderTree {
    pub fn new(records: Arc<dyn RecordStore>, content: Arc<dyn ContentStore>) -> Self {
        Self {
            records,
            content,
            locks: Arc::new(AssetLockManager::new()),
            folder_moves: Arc::new(Mutex::new(())),
        }
    }

    pub fn records(&self) -> &Arc<dyn RecordStore> {
        &self.records
    }

    pub fn content(&self) -> &Arc<dyn ContentStore> {
        &self.content
    }

    /// Create and persist a new root folder for `owner`.
    pub fn create_root(&self, owner: Id, perm: u32) -> Result<Folder, FsError> {
        let mut root = Folder::new("", perm);
        root.metadata.owner = owner;
        self.persist("create_root", &root.id().to_string(), &root)?;
        info!(root = %root.id(), %owner, "created root folder");
        Ok(root)
    }

    pub fn load_asset(&self, op: &'static str, id: &Id) -> Result<Asset, FsError> {
        self.records.find::<Asset>(id).map_err(|e| match e {
            StorageError::NotFound(_) => FsError::not_exist(op, id.to_string()),
            e => FsError::storage(op, id.to_string(), e),
        })
    }

    /// Load a folder record; a file record fails with `NotFolder`.
    pub fn load_folder(&self, op: &'static str, id: &Id) -> Result<Folder, FsError> {
        self.load_asset(op, id)?.into_folder(op)
    }

    /// Rehydrate the asset an entry points at, checking its kind.
    fn hydrate(&self, entry: &FolderEntry) -> Result<Asset, StorageError> {
        let mut asset = self.records.find::<Asset>(&entry.id)?;
        if asset.is_folder() != entry.is_folder {
            return Err(StorageError::KindMismatch {
                id: entry.id,
                expected: entry.kind(),
                found: asset.kind(),
            });
        }
        if asset.name() != entry.name {
            warn!(
                id = %entry.id,
                entry = %entry.name,
                record = %asset.name(),
                "record name differs from folder entry, using entry name"
            );
            asset.metadata_mut().name = entry.name.clone();
        }
        Ok(asset)
    }

    fn hydrate_for(
        &self,
        op: &'static str,
        path: &str,
        entry: &FolderEntry,
    ) -> Result<Asset, FsError> {
        self.hydrate(entry).map_err(|e| match e {
            StorageError::NotFound(id) => {
                warn!(%id, path, "folder entry points to a missing record");
                FsError::not_exist(op, path)
            }
            e => FsError::storage(op, path, e),
        })
    }

    fn persist<T: Storable>(&self, op: &'static str, path: &str, item: &T) -> Result<(), FsError> {
        self.records
            .save(item)
            .map_err(|e| FsError::storage(op, path, e))
    }

    /// Resolve `components` starting at folder `start`.
    ///
    /// An empty path returns the start folder itself. Walking through a file,
    /// a missing name, or an entry whose record is gone all fail with `NotExist`.
    pub fn find<S: AsRef<str>>(&self, start: &Id, components: &[S]) -> Result<Asset, FsError> {
        let mut current = self.load_folder("find", start)?;
        let mut walked = String::new();
        for (i, component) in components.iter().enumerate() {
            let name = component.as_ref();
            walked.push('/');
            walked.push_str(name);

            let entry = current
                .entry(name)
                .ok_or_else(|| FsError::not_exist("find", walked.clone()))?;
            let asset = self.hydrate_for("find", &walked, entry)?;
            let last = i + 1 == components.len();
            match asset {
                asset if last => return Ok(asset),
                Asset::Folder(folder) => current = folder,
                Asset::File(_) => return Err(FsError::not_exist("find", walked)),
            }
        }
        Ok(Asset::Folder(current))
    }

    /// Describe an asset. File size and time come from its content.
    pub fn stat(&self, asset: &Asset) -> Result<AssetInfo, FsError> {
        match asset {
            Asset::Folder(folder) => Ok(AssetInfo::for_folder(folder)),
            Asset::File(file) => {
                let content = self
                    .content
                    .stat_id(&file.content_id)
                    .map_err(|e| FsError::io("stat", file.name(), e))?;
                Ok(file.info(&content))
            }
        }
    }

    /// List a folder, best-effort.
    ///
    /// Entries whose record cannot be hydrated or described are skipped with
    /// a warning and reported in [`DirListing::skipped`]. `count == 0` lists
    /// every entry; otherwise at most `count` entries are returned.
    pub fn readdir(&self, id: &Id, count: usize) -> Result<DirListing, FsError> {
        let folder = self.load_folder("readdir", id)?;
        let mut listing = DirListing::default();
        for entry in folder.entries() {
            if count > 0 && listing.entries.len() >= count {
                break;
            }
            match self
                .hydrate_for("readdir", &entry.name, entry)
                .and_then(|asset| self.stat(&asset))
            {
                Ok(info) => listing.entries.push(info),
                Err(error) => {
                    warn!(
                        folder = %folder.id(),
                        name = %entry.name,
                        child = %entry.id,
                        %error,
                        "readdir skipping entry"
                    );
                    listing.skipped.push(SkippedEntry {
                        name: entry.name.clone(),
                        error,
                    });
                }
            }
        }
        Ok(listing)
    }

    /// Open a file's content stream.
    pub fn open_content(&self, file: File, flags: OpenFlags) -> Result<FileHandle, FsError> {
        let flags = OpenFlags {
            create_new: false,
            ..flags
        };
        let stream = self
            .content
            .open_id(&file.content_id, flags)
            .map_err(|e| FsError::io("open", file.name(), e))?;
        Ok(FileHandle::new(file, stream))
    }
}

/// Names must be non-empty, free of `/`, and not `.` or `..`.
pub(crate) fn validate_name(op: &'static str, name: &str) -> Result<(), FsError> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return Err(FsError::invalid_path(op, name));
    }
    if name.len() > u16::MAX as usize {
        return Err(FsError::storage(
            op,
            format!("{}...", name.chars().take(32).collect::<String>()),
            StorageError::NameTooLong(name.len()),
        ));
    }
    Ok(())
}
