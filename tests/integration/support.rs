use bms::{FolderFileSystem, FolderTree, Id, LocalContentStore, MemoryRecordStore, SledRecordStore};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// A tree over the in-memory record store with content under `content_dir`.
pub fn memory_tree(content_dir: &Path) -> (FolderTree, Arc<MemoryRecordStore>) {
    let records = Arc::new(MemoryRecordStore::new());
    let content = Arc::new(LocalContentStore::new(content_dir).unwrap());
    (FolderTree::new(records.clone(), content), records)
}

/// A tree over sled and local content, both under `dir`.
pub fn sled_tree(dir: &Path) -> (FolderTree, Arc<SledRecordStore>) {
    let records = Arc::new(SledRecordStore::open(&dir.join("records")).unwrap());
    let content = Arc::new(LocalContentStore::new(dir.join("content")).unwrap());
    (FolderTree::new(records.clone(), content), records)
}

/// A fresh user filesystem backed by memory records.
pub fn user_filesystem() -> (FolderFileSystem, TempDir) {
    let temp = TempDir::new().unwrap();
    let (tree, _records) = memory_tree(temp.path());
    let owner = Id::new();
    let root = tree.create_root(owner, 0o700).unwrap();
    (FolderFileSystem::new(tree, root.id(), owner), temp)
}
