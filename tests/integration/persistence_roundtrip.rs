use bms::store::RecordStoreExt;
use bms::{FileSystem, Folder, FolderFileSystem, Id, OpenFlags};
use std::collections::BTreeSet;
use std::io::Read;
use tempfile::TempDir;

use crate::integration::support::sled_tree;

#[test]
fn root_listing_round_trips_through_sled() {
    let temp = TempDir::new().unwrap();
    let owner = Id::new();
    let mut expected = BTreeSet::new();

    let root_id = {
        let (tree, _records) = sled_tree(temp.path());
        let root = tree.create_root(owner, 0o700).unwrap();
        for i in 0..12 {
            let name = format!("folder-{:02}", i);
            tree.mkfolder(&root.id(), &name, 0o755, owner).unwrap();
            expected.insert(name);
            let name = format!("file-{:02}", i);
            tree.create_file(&root.id(), &name, 0o644, owner).unwrap();
            expected.insert(name);
        }
        root.id()
    };

    // Reopen from disk
    let (tree, records) = sled_tree(temp.path());
    let root: Folder = records.find(&root_id).unwrap();
    assert_eq!(root.len(), 24);

    let listing = tree.readdir(&root_id, 0).unwrap();
    assert!(listing.is_complete());
    let names: BTreeSet<String> = listing.entries.iter().map(|e| e.name.clone()).collect();
    assert_eq!(names, expected);
}

#[test]
fn file_content_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let owner = Id::new();

    let root_id = {
        let (tree, _records) = sled_tree(temp.path());
        let root = tree.create_root(owner, 0o700).unwrap();
        let fs = FolderFileSystem::new(tree, root.id(), owner);
        fs.mkdir("/docs", 0o755).unwrap();
        let mut handle = fs
            .open_file("/docs/readme.md", OpenFlags::create(), 0o644)
            .unwrap();
        handle.write(b"# persisted\n").unwrap();
        handle.close().unwrap();
        root.id()
    };

    let (tree, _records) = sled_tree(temp.path());
    let fs = FolderFileSystem::new(tree, root_id, owner);
    let info = fs.stat("/docs/readme.md").unwrap();
    assert_eq!(info.size, 12);
    assert_eq!(info.owner, owner);

    let mut file = fs
        .open_file("/docs/readme.md", OpenFlags::read_only(), 0)
        .unwrap()
        .into_file()
        .unwrap();
    let mut text = String::new();
    file.read_to_string(&mut text).unwrap();
    assert_eq!(text, "# persisted\n");
}
