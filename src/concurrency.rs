//! Per-asset locking for tree mutations
//!
//! Every load-mutate-persist cycle on a folder (or on an asset's own record)
//! holds that asset's write lock. Operations touching several assets acquire
//! their locks in ascending identifier order so they cannot deadlock.

use crate::types::Id;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Lock table keyed by asset identifier.
pub struct AssetLockManager {
    /// Map from Id to per-asset read-write lock
    locks: RwLock<HashMap<Id, Arc<RwLock<()>>>>,
}

impl AssetLockManager {
    pub fn new() -> Self {
        Self {
            locks: RwLock::new(HashMap::new()),
        }
    }

    /// Get or create the lock for an asset.
    pub fn get_lock(&self, id: &Id) -> Arc<RwLock<()>> {
        {
            let map = self.locks.read();
            if let Some(lock) = map.get(id) {
                return lock.clone();
            }
        }

        // Double-check under the write lock; another thread may have inserted it
        let mut map = self.locks.write();
        map.entry(*id)
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    /// Run `f` holding the write locks of every id in `ids`.
    ///
    /// Duplicates are collapsed and locks are taken in ascending id order.
    pub fn with_write_locks<R>(&self, ids: &[Id], f: impl FnOnce() -> R) -> R {
        let mut ordered: Vec<Id> = ids.to_vec();
        ordered.sort();
        ordered.dedup();
        let locks: Vec<Arc<RwLock<()>>> = ordered.iter().map(|id| self.get_lock(id)).collect();
        let _guards: Vec<_> = locks.iter().map(|lock| lock.write()).collect();
        f()
    }

    /// Drop the lock entry of a deleted asset. Identifiers are never reused.
    pub fn forget(&self, id: &Id) {
        self.locks.write().remove(id);
    }

    pub fn len(&self) -> usize {
        self.locks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.read().is_empty()
    }
}

impl Default for AssetLockManager {
    fn default() -> Self {
        Self::new()
    }
}
