use bms::store::{RecordStore, RecordStoreExt};
use bms::{Asset, Id};
use tempfile::TempDir;

use crate::integration::support::memory_tree;

#[test]
fn duplicate_mkfolder_leaves_parent_unchanged() {
    let temp = TempDir::new().unwrap();
    let (tree, _records) = memory_tree(temp.path());
    let owner = Id::new();
    let root = tree.create_root(owner, 0o700).unwrap();

    tree.mkfolder(&root.id(), "a", 0o755, owner).unwrap();
    let before = tree.load_folder("test", &root.id()).unwrap().len();

    let err = tree.mkfolder(&root.id(), "a", 0o755, owner).unwrap_err();
    assert!(err.is_already_exists());
    assert_eq!(tree.load_folder("test", &root.id()).unwrap().len(), before);
}

#[test]
fn move_between_folders_updates_both() {
    let temp = TempDir::new().unwrap();
    let (tree, records) = memory_tree(temp.path());
    let owner = Id::new();
    let root = tree.create_root(owner, 0o700).unwrap();
    let a = tree.mkfolder(&root.id(), "A", 0o755, owner).unwrap();
    let b = tree.mkfolder(&root.id(), "B", 0o755, owner).unwrap();
    let x = tree.mkfolder(&a.id(), "x", 0o755, owner).unwrap();
    tree.create_file(&x.id(), "inner", 0o644, owner).unwrap();

    tree.move_entry(&a.id(), "x", &b.id()).unwrap();

    assert!(tree.find(&a.id(), &["x"]).unwrap_err().is_not_exist());
    let moved = tree.find(&b.id(), &["x"]).unwrap();
    assert_eq!(moved.id(), x.id());
    // The subtree travels with it
    assert!(tree.find(&b.id(), &["x", "inner"]).is_ok());

    // Both parents are persisted, not just mutated in memory
    let stored_a: Asset = records.find(&a.id()).unwrap();
    let stored_b: Asset = records.find(&b.id()).unwrap();
    assert!(stored_a.into_folder("test").unwrap().is_empty());
    assert!(stored_b.into_folder("test").unwrap().contains("x"));
}

#[test]
fn recursive_remove_deletes_four_records() {
    let temp = TempDir::new().unwrap();
    let (tree, records) = memory_tree(temp.path());
    let owner = Id::new();
    let root = tree.create_root(owner, 0o700).unwrap();

    let folder = tree.mkfolder(&root.id(), "folder", 0o755, owner).unwrap();
    let file = tree.create_file(&folder.id(), "file", 0o644, owner).unwrap();
    let nested = tree.mkfolder(&folder.id(), "nested", 0o755, owner).unwrap();
    let nested_file = tree.create_file(&nested.id(), "nested_file", 0o644, owner).unwrap();
    assert_eq!(records.len(), 5);

    tree.remove(&root.id(), "folder").unwrap();

    for id in [folder.id(), file.id(), nested.id(), nested_file.id()] {
        assert!(records.get(&id).unwrap().is_none(), "record {} survived", id);
    }
    assert_eq!(records.len(), 1);
    assert!(!tree.load_folder("test", &root.id()).unwrap().contains("folder"));
    assert!(tree.content().stat_id(&nested_file.content_id).is_err());
}

#[test]
fn rename_keeps_identity_and_propagates_name() {
    let temp = TempDir::new().unwrap();
    let (tree, records) = memory_tree(temp.path());
    let owner = Id::new();
    let root = tree.create_root(owner, 0o700).unwrap();
    let file = tree.create_file(&root.id(), "draft.txt", 0o644, owner).unwrap();

    tree.rename(&root.id(), "draft.txt", "final.txt").unwrap();

    let found = tree.find(&root.id(), &["final.txt"]).unwrap();
    assert_eq!(found.id(), file.id());
    let stored: Asset = records.find(&file.id()).unwrap();
    assert_eq!(stored.name(), "final.txt");
    assert!(tree.find(&root.id(), &["draft.txt"]).unwrap_err().is_not_exist());
}

#[test]
fn readdir_survives_a_corrupt_child() {
    let temp = TempDir::new().unwrap();
    let (tree, records) = memory_tree(temp.path());
    let owner = Id::new();
    let root = tree.create_root(owner, 0o700).unwrap();
    tree.mkfolder(&root.id(), "ok", 0o755, owner).unwrap();
    let broken = tree.mkfolder(&root.id(), "broken", 0o755, owner).unwrap();
    records.put(&broken.id(), vec![0xde, 0xad]).unwrap();

    let listing = tree.readdir(&root.id(), 0).unwrap();
    assert_eq!(listing.names(), vec!["ok"]);
    assert!(!listing.is_complete());
    assert!(listing.first_error().unwrap().storage_source().is_some());
}
