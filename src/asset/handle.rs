//! Handles returned by `open_file`.

use super::{AssetInfo, DirListing, FileHandle, Folder};
use crate::error::FsError;
use crate::tree::FolderTree;
use std::io::{self, SeekFrom};

/// An open folder. Content operations are refused; listing goes through the tree.
pub struct FolderHandle {
    folder: Folder,
    tree: FolderTree,
}

impl FolderHandle {
    pub(crate) fn new(folder: Folder, tree: FolderTree) -> Self {
        Self { folder, tree }
    }

    pub fn folder(&self) -> &Folder {
        &self.folder
    }

    /// List up to `count` entries; `0` lists everything.
    pub fn readdir(&self, count: usize) -> Result<DirListing, FsError> {
        self.tree.readdir(&self.folder.id(), count)
    }

    pub fn stat(&self) -> AssetInfo {
        AssetInfo::for_folder(&self.folder)
    }
}

impl std::fmt::Debug for FolderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderHandle")
            .field("folder", &self.folder)
            .finish_non_exhaustive()
    }
}

/// Result of opening a path: either kind of asset.
#[derive(Debug)]
pub enum OpenAsset {
    Folder(FolderHandle),
    File(FileHandle),
}

impl OpenAsset {
    pub fn is_folder(&self) -> bool {
        matches!(self, OpenAsset::Folder(_))
    }

    pub fn name(&self) -> &str {
        match self {
            OpenAsset::Folder(handle) => handle.folder().name(),
            OpenAsset::File(handle) => handle.file().name(),
        }
    }

    pub fn stat(&self) -> Result<AssetInfo, FsError> {
        match self {
            OpenAsset::Folder(handle) => Ok(handle.stat()),
            OpenAsset::File(handle) => handle.stat(),
        }
    }

    pub fn readdir(&self, count: usize) -> Result<DirListing, FsError> {
        match self {
            OpenAsset::Folder(handle) => handle.readdir(count),
            OpenAsset::File(handle) => Err(FsError::not_folder("readdir", handle.file().name())),
        }
    }

    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsError> {
        let file = self.file_mut("read")?;
        io::Read::read(&mut *file, buf).map_err(|e| FsError::io("read", file.file().name(), e))
    }

    pub fn write(&mut self, buf: &[u8]) -> Result<usize, FsError> {
        let file = self.file_mut("write")?;
        io::Write::write(&mut *file, buf).map_err(|e| FsError::io("write", file.file().name(), e))
    }

    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64, FsError> {
        let file = self.file_mut("seek")?;
        io::Seek::seek(&mut *file, pos).map_err(|e| FsError::io("seek", file.file().name(), e))
    }

    pub fn close(self) -> Result<(), FsError> {
        match self {
            OpenAsset::Folder(_) => Ok(()),
            OpenAsset::File(handle) => handle.close(),
        }
    }

    /// The file handle, or `IsFolder` for folders.
    pub fn into_file(self) -> Result<FileHandle, FsError> {
        match self {
            OpenAsset::File(handle) => Ok(handle),
            OpenAsset::Folder(handle) => Err(FsError::is_folder("open", handle.folder().name())),
        }
    }

    fn file_mut(&mut self, op: &'static str) -> Result<&mut FileHandle, FsError> {
        match self {
            OpenAsset::File(handle) => Ok(handle),
            OpenAsset::Folder(handle) => Err(FsError::is_folder(op, handle.folder().name())),
        }
    }
}
