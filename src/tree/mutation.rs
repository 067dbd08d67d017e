//! Tree mutations: linking new assets, rename and move, metadata updates.

use super::{validate_name, FolderTree};
use crate::asset::{Asset, AssetInfo, File, Folder, FolderEntry};
use crate::error::FsError;
use crate::metadata::Metadata;
use crate::types::Id;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Attempts to pin a moving entry before giving up.
const MAX_RELINK_ATTEMPTS: usize = 16;

impl FolderTree {
    /// Create an empty folder named `name` under `parent`.
    ///
    /// Fails with `AlreadyExists` when the name is taken and `NotFolder` when
    /// `parent` is a file.
    pub fn mkfolder(
        &self,
        parent: &Id,
        name: &str,
        perm: u32,
        owner: Id,
    ) -> Result<Folder, FsError> {
        validate_name("mkfolder", name)?;
        let mut folder = Folder::new(name, perm);
        folder.metadata.owner = owner;
        self.link_new("mkfolder", parent, &Asset::Folder(folder.clone()))?;
        Ok(folder)
    }

    /// Create a file record with freshly allocated, empty content.
    pub fn create_file(
        &self,
        parent: &Id,
        name: &str,
        perm: u32,
        owner: Id,
    ) -> Result<File, FsError> {
        validate_name("create", name)?;
        let mut file = File::new(name, perm);
        file.metadata.owner = owner;
        self.content
            .allocate_id(&file.content_id)
            .map_err(|e| FsError::io("create", name, e))?;

        if let Err(e) = self.link_new("create", parent, &Asset::File(file.clone())) {
            if let Err(cleanup) = self.content.remove_id(&file.content_id) {
                warn!(content = %file.content_id, error = %cleanup, "failed to release content of unlinked file");
            }
            return Err(e);
        }
        Ok(file)
    }

    /// Persist an already-built asset and link it under `parent`.
    pub fn add_asset(&self, parent: &Id, asset: &Asset) -> Result<(), FsError> {
        self.link_new("add", parent, asset)
    }

    fn link_new(&self, op: &'static str, parent: &Id, asset: &Asset) -> Result<(), FsError> {
        let name = asset.name();
        validate_name(op, name)?;
        self.locks.with_write_locks(&[*parent], || {
            let mut folder = self.load_folder(op, parent)?;
            if folder.contains(name) {
                return Err(FsError::already_exists(op, name));
            }

            // Child record first; the parent never names a record that is not there.
            self.persist(op, name, asset)?;
            folder.link(asset.entry());
            folder.metadata.touch();
            if let Err(e) = self.persist(op, name, &folder) {
                if let Err(cleanup) = self.records.delete(&asset.id()) {
                    warn!(id = %asset.id(), error = %cleanup, "failed to drop orphaned record");
                }
                return Err(e);
            }

            debug!(%parent, child = %asset.id(), name, kind = asset.kind(), "linked asset");
            Ok(())
        })
    }

    /// Rename the entry `old` in `parent` to `new`.
    pub fn rename(&self, parent: &Id, old: &str, new: &str) -> Result<(), FsError> {
        self.relink("rename", parent, old, parent, new)
    }

    /// Move the entry `name` from `src` into `dst`, keeping its name.
    pub fn move_entry(&self, src: &Id, name: &str, dst: &Id) -> Result<(), FsError> {
        self.relink("move", src, name, dst, name)
    }

    /// Move the entry `name` from `src` into `dst` under `new_name`.
    pub fn move_as(&self, src: &Id, name: &str, dst: &Id, new_name: &str) -> Result<(), FsError> {
        self.relink("rename", src, name, dst, new_name)
    }

    fn relink(
        &self,
        op: &'static str,
        src: &Id,
        name: &str,
        dst: &Id,
        new_name: &str,
    ) -> Result<(), FsError> {
        validate_name(op, new_name)?;
        for _ in 0..MAX_RELINK_ATTEMPTS {
            // Unlocked peek to learn which child record takes part.
            let (child, is_folder) = self
                .load_folder(op, src)?
                .entry(name)
                .map(|entry| (entry.id, entry.is_folder))
                .ok_or_else(|| FsError::not_exist(op, name))?;

            let mut ids = vec![*src, *dst];
            if name != new_name {
                ids.push(child);
            }
            // Only folder moves across parents can close a cycle; one at a time
            // keeps the subtree walk below stable.
            let _moving = (is_folder && src != dst).then(|| self.folder_moves.lock());
            let settled = self.locks.with_write_locks(&ids, || {
                self.relink_locked(op, src, name, dst, new_name, &child)
            })?;
            if settled {
                debug!(%src, %dst, name, new_name, "relinked entry");
                return Ok(());
            }
            debug!(%src, name, "entry changed while locking, retrying");
        }
        Err(FsError::not_exist(op, name))
    }

    /// Returns `Ok(false)` when `name` no longer points at `child`.
    fn relink_locked(
        &self,
        op: &'static str,
        src: &Id,
        name: &str,
        dst: &Id,
        new_name: &str,
        child: &Id,
    ) -> Result<bool, FsError> {
        let mut source = self.load_folder(op, src)?;
        let entry = match source.entry(name) {
            None => return Err(FsError::not_exist(op, name)),
            Some(entry) if entry.id != *child => return Ok(false),
            Some(entry) => entry.clone(),
        };
        if src == dst && name == new_name {
            return Ok(true);
        }
        if entry.is_folder && src != dst && self.subtree_contains(op, &entry.id, dst)? {
            return Err(FsError::invalid_path(op, new_name));
        }

        let mut target = if src == dst {
            None
        } else {
            Some(self.load_folder(op, dst)?)
        };
        if target.as_ref().unwrap_or(&source).contains(new_name) {
            return Err(FsError::already_exists(op, new_name));
        }

        if name != new_name {
            let mut asset = self.hydrate_for(op, name, &entry)?;
            asset.metadata_mut().name = new_name.to_string();
            self.persist(op, new_name, &asset)?;
        }

        source.unlink(name);
        source.metadata.touch();
        let moved = FolderEntry {
            name: new_name.to_string(),
            ..entry
        };
        match target.as_mut() {
            Some(target) => {
                target.link(moved);
                target.metadata.touch();
                // Destination before source.
                self.persist(op, new_name, target)?;
                self.persist(op, name, &source)?;
            }
            None => {
                source.link(moved);
                self.persist(op, new_name, &source)?;
            }
        }
        Ok(true)
    }

    /// True when `target` is `top` or any folder below it.
    fn subtree_contains(&self, op: &'static str, top: &Id, target: &Id) -> Result<bool, FsError> {
        let mut pending = vec![*top];
        let mut seen = HashSet::new();
        while let Some(id) = pending.pop() {
            if id == *target {
                return Ok(true);
            }
            if !seen.insert(id) {
                continue;
            }
            let folder = match self.load_folder(op, &id) {
                Ok(folder) => folder,
                // Dismantled concurrently, or a damaged record.
                Err(e) if e.is_not_exist() || e.is_not_folder() => continue,
                Err(e) => return Err(e),
            };
            pending.extend(folder.entries().filter(|e| e.is_folder).map(|e| e.id));
        }
        Ok(false)
    }

    /// Replace the permission bits of an asset.
    pub fn set_permissions(&self, id: &Id, perm: u32) -> Result<AssetInfo, FsError> {
        self.update_metadata("chmod", id, |m| m.set_perm(perm))
    }

    pub fn set_owner(&self, id: &Id, owner: Id) -> Result<AssetInfo, FsError> {
        self.update_metadata("chown", id, |m| m.owner = owner)
    }

    /// Set the modification time of an asset record to now.
    pub fn touch(&self, id: &Id) -> Result<AssetInfo, FsError> {
        self.update_metadata("touch", id, Metadata::touch)
    }

    fn update_metadata(
        &self,
        op: &'static str,
        id: &Id,
        update: impl FnOnce(&mut Metadata),
    ) -> Result<AssetInfo, FsError> {
        self.locks.with_write_locks(&[*id], || {
            let mut asset = self.load_asset(op, id)?;
            update(asset.metadata_mut());
            self.persist(op, asset.name(), &asset)?;
            self.stat(&asset)
        })
    }
}
