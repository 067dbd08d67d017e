//! Volatile record store for tests and ephemeral instances.

use super::RecordStore;
use crate::error::StorageError;
use crate::types::Id;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<Id, Vec<u8>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.records.read().contains_key(id)
    }
}

impl RecordStore for MemoryRecordStore {
    fn get(&self, id: &Id) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.records.read().get(id).cloned())
    }

    fn put(&self, id: &Id, record: Vec<u8>) -> Result<(), StorageError> {
        self.records.write().insert(*id, record);
        Ok(())
    }

    fn delete(&self, id: &Id) -> Result<(), StorageError> {
        self.records.write().remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;

    #[test]
    fn test_memory_store_contract() {
        let store = MemoryRecordStore::new();
        contract::run_all(&store);
    }

    #[test]
    fn test_len_tracks_records() {
        let store = MemoryRecordStore::new();
        assert!(store.is_empty());
        let id = Id::new();
        store.put(&id, vec![1, 2, 3]).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.contains(&id));
        store.delete(&id).unwrap();
        assert!(store.is_empty());
    }
}
