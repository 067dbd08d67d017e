//! Record Store
//!
//! Key/value persistence for asset records. Keys are the 16 raw identifier
//! bytes; values are the binary record encodings. Single-key reads and writes
//! are atomic; there is no multi-key transaction and saves are last-writer-wins.

pub mod memory;
pub mod persistence;

use crate::error::StorageError;
use crate::types::Id;

pub use memory::MemoryRecordStore;
pub use persistence::SledRecordStore;

/// An entity that can encode itself into a record and report its key.
pub trait Storable: Sized {
    fn id(&self) -> Id;
    fn encode(&self) -> Result<Vec<u8>, StorageError>;
    fn decode(bytes: &[u8]) -> Result<Self, StorageError>;
}

/// Raw record store interface
pub trait RecordStore: Send + Sync {
    fn get(&self, id: &Id) -> Result<Option<Vec<u8>>, StorageError>;
    fn put(&self, id: &Id, record: Vec<u8>) -> Result<(), StorageError>;
    /// Deleting an absent key is not an error.
    fn delete(&self, id: &Id) -> Result<(), StorageError>;

    fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Typed access on top of any [`RecordStore`].
pub trait RecordStoreExt: RecordStore {
    /// Load and decode a record; an absent key fails with `NotFound`.
    fn find<T: Storable>(&self, id: &Id) -> Result<T, StorageError> {
        match self.get(id)? {
            Some(bytes) => T::decode(&bytes),
            None => Err(StorageError::NotFound(*id)),
        }
    }

    fn save<T: Storable>(&self, item: &T) -> Result<(), StorageError> {
        let id = item.id();
        let record = item.encode()?;
        tracing::trace!(%id, bytes = record.len(), "saving record");
        self.put(&id, record)
    }
}

impl<S: RecordStore + ?Sized> RecordStoreExt for S {}
