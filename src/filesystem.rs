//! Filesystem Façade
//!
//! Slash-separated paths over one user's folder tree. Every error leaving this
//! module carries the cleaned path the caller asked about.

use crate::asset::{Asset, AssetInfo, DirListing, Folder, FolderHandle, OpenAsset};
use crate::content::OpenFlags;
use crate::error::FsError;
use crate::tree::FolderTree;
use crate::types::Id;
use tracing::{debug, info};

/// The surface a protocol adapter consumes.
pub trait FileSystem {
    fn mkdir(&self, path: &str, perm: u32) -> Result<(), FsError>;
    fn open_file(&self, path: &str, flags: OpenFlags, perm: u32) -> Result<OpenAsset, FsError>;
    fn remove_all(&self, path: &str) -> Result<(), FsError>;
    fn rename(&self, old_path: &str, new_path: &str) -> Result<(), FsError>;
    fn stat(&self, path: &str) -> Result<AssetInfo, FsError>;
}

/// Lexically clean `path` into its components.
///
/// Repeated slashes and `.` vanish, `..` pops (never above the root), and a
/// missing leading slash is implied. The root cleans to no components.
pub fn split_path(path: &str) -> Vec<&str> {
    let mut components = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                components.pop();
            }
            name => components.push(name),
        }
    }
    components
}

/// Canonical absolute form of `path`.
pub fn clean_path(path: &str) -> String {
    format!("/{}", split_path(path).join("/"))
}

/// [`FileSystem`] over the tree rooted at one user's root folder.
#[derive(Clone)]
pub struct FolderFileSystem {
    tree: FolderTree,
    root: Id,
    owner: Id,
}

impl FolderFileSystem {
    /// `owner` is recorded on everything created through this handle.
    pub fn new(tree: FolderTree, root: Id, owner: Id) -> Self {
        Self { tree, root, owner }
    }

    pub fn tree(&self) -> &FolderTree {
        &self.tree
    }

    pub fn root(&self) -> Id {
        self.root
    }

    pub fn owner(&self) -> Id {
        self.owner
    }

    fn resolve(&self, components: &[&str]) -> Result<Asset, FsError> {
        self.tree.find(&self.root, components)
    }

    fn resolve_folder(&self, op: &'static str, components: &[&str]) -> Result<Folder, FsError> {
        self.resolve(components)?.into_folder(op)
    }

    /// List the folder at `path`; see [`FolderTree::readdir`].
    pub fn read_dir(&self, path: &str, count: usize) -> Result<DirListing, FsError> {
        let cleaned = clean_path(path);
        let folder = self
            .resolve_folder("readdir", &split_path(path))
            .map_err(|e| e.with_path(&cleaned))?;
        self.tree
            .readdir(&folder.id(), count)
            .map_err(|e| e.with_path(&cleaned))
    }

    pub fn set_permissions(&self, path: &str, perm: u32) -> Result<AssetInfo, FsError> {
        let cleaned = clean_path(path);
        let id = self.resolve(&split_path(path)).map_err(|e| e.with_path(&cleaned))?.id();
        self.tree
            .set_permissions(&id, perm)
            .map_err(|e| e.with_path(&cleaned))
    }

    pub fn set_owner(&self, path: &str, owner: Id) -> Result<AssetInfo, FsError> {
        let cleaned = clean_path(path);
        let id = self.resolve(&split_path(path)).map_err(|e| e.with_path(&cleaned))?.id();
        self.tree
            .set_owner(&id, owner)
            .map_err(|e| e.with_path(&cleaned))
    }

    pub fn touch(&self, path: &str) -> Result<AssetInfo, FsError> {
        let cleaned = clean_path(path);
        let id = self.resolve(&split_path(path)).map_err(|e| e.with_path(&cleaned))?.id();
        self.tree.touch(&id).map_err(|e| e.with_path(&cleaned))
    }

    fn open_leaf(
        &self,
        parent: &Folder,
        leaf: &str,
        flags: OpenFlags,
        perm: u32,
    ) -> Result<Asset, FsError> {
        match self.tree.find(&parent.id(), &[leaf]) {
            Ok(_) if flags.create_new => Err(FsError::already_exists("open", leaf)),
            Ok(asset) => Ok(asset),
            Err(e) if e.is_not_exist() && flags.wants_create() => {
                match self.tree.create_file(&parent.id(), leaf, perm, self.owner) {
                    Ok(file) => {
                        debug!(parent = %parent.id(), file = %file.id(), leaf, "created file on open");
                        Ok(Asset::File(file))
                    }
                    // Lost a create race; open what the winner linked.
                    Err(e) if e.is_already_exists() && !flags.create_new => {
                        self.tree.find(&parent.id(), &[leaf])
                    }
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }
}

impl FileSystem for FolderFileSystem {
    fn mkdir(&self, path: &str, perm: u32) -> Result<(), FsError> {
        let cleaned = clean_path(path);
        let components = split_path(path);
        let Some((leaf, parent)) = components.split_last() else {
            return Err(FsError::already_exists("mkdir", cleaned));
        };

        let parent = self
            .resolve_folder("mkdir", parent)
            .map_err(|e| e.with_path(&cleaned))?;
        let folder = self
            .tree
            .mkfolder(&parent.id(), leaf, perm, self.owner)
            .map_err(|e| e.with_path(&cleaned))?;
        info!(path = %cleaned, id = %folder.id(), "mkdir");
        Ok(())
    }

    fn open_file(&self, path: &str, flags: OpenFlags, perm: u32) -> Result<OpenAsset, FsError> {
        let cleaned = clean_path(path);
        let components = split_path(path);
        let Some((leaf, parent)) = components.split_last() else {
            if flags.wants_write() {
                return Err(FsError::is_folder("open", cleaned));
            }
            let root = self
                .tree
                .load_folder("open", &self.root)
                .map_err(|e| e.with_path(&cleaned))?;
            return Ok(OpenAsset::Folder(FolderHandle::new(root, self.tree.clone())));
        };

        let parent = self.resolve(parent).map_err(|e| e.with_path(&cleaned))?;
        let Asset::Folder(parent) = parent else {
            let parent_path = clean_path(&components[..components.len() - 1].join("/"));
            return Err(FsError::not_folder("open", parent_path));
        };

        let asset = self
            .open_leaf(&parent, leaf, flags, perm)
            .map_err(|e| e.with_path(&cleaned))?;
        debug!(path = %cleaned, kind = asset.kind(), ?flags, "open");
        match asset {
            Asset::Folder(_) if flags.wants_write() => Err(FsError::is_folder("open", cleaned)),
            Asset::Folder(folder) => Ok(OpenAsset::Folder(FolderHandle::new(folder, self.tree.clone()))),
            Asset::File(file) => self
                .tree
                .open_content(file, flags)
                .map(OpenAsset::File)
                .map_err(|e| e.with_path(&cleaned)),
        }
    }

    /// Remove `path` and everything below it. A path that does not exist is
    /// already removed.
    fn remove_all(&self, path: &str) -> Result<(), FsError> {
        let cleaned = clean_path(path);
        let components = split_path(path);
        let Some((leaf, parent)) = components.split_last() else {
            return Err(FsError::invalid_path("remove", cleaned));
        };

        let parent = match self.resolve_folder("remove", parent) {
            Ok(parent) => parent,
            Err(e) if e.is_not_exist() => return Ok(()),
            Err(e) => return Err(e.with_path(&cleaned)),
        };
        match self.tree.remove(&parent.id(), leaf) {
            Ok(()) => {
                info!(path = %cleaned, "removed");
                Ok(())
            }
            Err(e) if e.is_not_exist() && !parent.contains(leaf) => Ok(()),
            Err(e) => Err(e.with_path(&cleaned)),
        }
    }

    /// Rename in place when both paths share a parent, otherwise move.
    fn rename(&self, old_path: &str, new_path: &str) -> Result<(), FsError> {
        let old_clean = clean_path(old_path);
        let new_clean = clean_path(new_path);
        let old_components = split_path(old_path);
        let new_components = split_path(new_path);

        let (Some((old_leaf, old_parent)), Some((new_leaf, new_parent))) =
            (old_components.split_last(), new_components.split_last())
        else {
            return Err(FsError::invalid_path("rename", old_clean));
        };
        if new_clean.starts_with(&format!("{}/", old_clean)) {
            return Err(FsError::invalid_path("rename", new_clean));
        }

        let src = self
            .resolve_folder("rename", old_parent)
            .map_err(|e| e.with_path(&old_clean))?;
        let result = if old_parent == new_parent {
            self.tree.rename(&src.id(), old_leaf, new_leaf)
        } else {
            let dst = self
                .resolve_folder("rename", new_parent)
                .map_err(|e| e.with_path(&new_clean))?;
            self.tree.move_as(&src.id(), old_leaf, &dst.id(), new_leaf)
        };
        result.map_err(|e| {
            let path = if e.is_already_exists() { &new_clean } else { &old_clean };
            e.with_path(path.as_str())
        })?;
        info!(from = %old_clean, to = %new_clean, "renamed");
        Ok(())
    }

    fn stat(&self, path: &str) -> Result<AssetInfo, FsError> {
        let cleaned = clean_path(path);
        let asset = self
            .resolve(&split_path(path))
            .map_err(|e| e.with_path(&cleaned))?;
        self.tree.stat(&asset).map_err(|e| e.with_path(&cleaned))
    }
}
