//! Durable record store backed by sled.
//!
//! All records live in one named tree; opening it is idempotent.

use super::RecordStore;
use crate::error::StorageError;
use crate::types::Id;
use std::path::Path;

/// Name of the sled tree holding every asset record.
pub const RECORDS_TREE: &str = "bms";

pub struct SledRecordStore {
    db: sled::Db,
    records: sled::Tree,
}

impl SledRecordStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    pub fn from_db(db: sled::Db) -> Result<Self, StorageError> {
        let records = db.open_tree(RECORDS_TREE)?;
        Ok(Self { db, records })
    }

    pub fn db(&self) -> &sled::Db {
        &self.db
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for SledRecordStore {
    fn get(&self, id: &Id) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.records.get(id.as_bytes())?.map(|v| v.to_vec()))
    }

    fn put(&self, id: &Id, record: Vec<u8>) -> Result<(), StorageError> {
        self.records.insert(id.as_bytes(), record)?;
        Ok(())
    }

    fn delete(&self, id: &Id) -> Result<(), StorageError> {
        self.records.remove(id.as_bytes())?;
        Ok(())
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.records.flush()?;
        Ok(())
    }
}
