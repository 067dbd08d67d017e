//! Recursive removal.
//!
//! The entry is unlinked from its parent first, so the subtree becomes
//! unreachable before it is dismantled. Dismantling is best-effort: every
//! reachable record and content stream is attempted, failures are logged,
//! and the first one is returned. No more than one lock is held at a time.

use super::FolderTree;
use crate::asset::{Asset, File, FolderEntry};
use crate::error::{FsError, StorageError};
use crate::store::RecordStoreExt;
use crate::types::Id;
use tracing::{debug, warn};

const OP: &str = "remove";

#[derive(Default)]
struct RemoveReport {
    removed: usize,
    first_error: Option<FsError>,
}

impl RemoveReport {
    fn fail(&mut self, error: FsError) {
        warn!(%error, "remove continuing past failure");
        if self.first_error.is_none() {
            self.first_error = Some(error);
        }
    }
}

impl FolderTree {
    /// Remove the entry `name` from `parent` along with everything below it.
    pub fn remove(&self, parent: &Id, name: &str) -> Result<(), FsError> {
        let entry = self.locks.with_write_locks(&[*parent], || {
            let mut folder = self.load_folder(OP, parent)?;
            let entry = folder
                .unlink(name)
                .ok_or_else(|| FsError::not_exist(OP, name))?;
            folder.metadata.touch();
            self.persist(OP, name, &folder)?;
            Ok::<_, FsError>(entry)
        })?;

        let mut report = RemoveReport::default();
        self.dismantle(&entry, name, &mut report);
        debug!(%parent, name, removed = report.removed, "removed subtree");
        match report.first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn dismantle(&self, entry: &FolderEntry, path: &str, report: &mut RemoveReport) {
        match self.hydrate(entry) {
            Err(StorageError::NotFound(id)) => {
                warn!(%id, path, "record already absent during remove");
            }
            Err(e) => {
                report.fail(FsError::storage(OP, path, e));
                self.dismantle_damaged(&entry.id, path, report);
            }
            Ok(Asset::File(file)) => self.dismantle_file(&file, path, report),
            Ok(Asset::Folder(folder)) => self.dismantle_folder(&folder.id(), path, report),
        }
    }

    /// Clean up after a record that disagreed with its entry, going by what
    /// the record actually holds. Undecodable records are just deleted.
    fn dismantle_damaged(&self, id: &Id, path: &str, report: &mut RemoveReport) {
        match self.records.find::<Asset>(id) {
            Ok(Asset::File(file)) => self.dismantle_file(&file, path, report),
            Ok(Asset::Folder(_)) => self.dismantle_folder(id, path, report),
            Err(StorageError::NotFound(_)) => {}
            Err(_) => self
                .locks
                .with_write_locks(&[*id], || self.delete_record(id, path, report)),
        }
    }

    /// Content first, then the record, both under the file's own lock.
    fn dismantle_file(&self, file: &File, path: &str, report: &mut RemoveReport) {
        self.locks.with_write_locks(&[file.id()], || {
            if let Err(e) = self.content.remove_id(&file.content_id) {
                report.fail(FsError::io(OP, path, e));
            }
            self.delete_record(&file.id(), path, report);
        });
    }

    /// Detach children in batches under the folder's lock, dismantle them
    /// unlocked, and delete the folder record once it is empty.
    fn dismantle_folder(&self, id: &Id, path: &str, report: &mut RemoveReport) {
        loop {
            let batch = self.locks.with_write_locks(&[*id], || {
                let mut folder = self.load_folder(OP, id)?;
                if folder.is_empty() {
                    self.records
                        .delete(id)
                        .map_err(|e| FsError::storage(OP, path, e))?;
                    return Ok(Vec::new());
                }
                let children: Vec<FolderEntry> = folder.entries().cloned().collect();
                for child in &children {
                    folder.unlink(&child.name);
                }
                self.persist(OP, path, &folder)?;
                Ok::<_, FsError>(children)
            });

            match batch {
                Ok(children) if children.is_empty() => {
                    self.locks.forget(id);
                    report.removed += 1;
                    return;
                }
                Ok(children) => {
                    for child in &children {
                        let child_path = format!("{}/{}", path, child.name);
                        self.dismantle(child, &child_path, report);
                    }
                }
                Err(e) if e.is_not_exist() => {
                    warn!(%id, path, "folder vanished during remove");
                    return;
                }
                Err(e) => {
                    report.fail(e);
                    return;
                }
            }
        }
    }

    fn delete_record(&self, id: &Id, path: &str, report: &mut RemoveReport) {
        match self.records.delete(id) {
            Ok(()) => {
                self.locks.forget(id);
                report.removed += 1;
            }
            Err(e) => report.fail(FsError::storage(OP, path, e)),
        }
    }
}
