use bms::metadata::MODE_DIR;
use bms::{FileSystem, FsError, OpenFlags};
use std::io::SeekFrom;

use crate::integration::support::user_filesystem;

#[test]
fn open_file_creates_and_links() {
    let (fs, _temp) = user_filesystem();
    fs.mkdir("/inbox", 0o755).unwrap();

    let handle = fs.open_file("/inbox/new.txt", OpenFlags::create(), 0o600).unwrap();
    assert!(!handle.is_folder());
    let info = handle.stat().unwrap();
    assert_eq!(info.name, "new.txt");
    assert_eq!(info.mode, 0o600);
    assert_eq!(info.size, 0);

    let listing = fs.read_dir("/inbox", 0).unwrap();
    assert_eq!(listing.names(), vec!["new.txt"]);
}

#[test]
fn write_flags_against_folders_fail_is_folder() {
    let (fs, _temp) = user_filesystem();
    fs.mkdir("/d", 0o755).unwrap();

    let write_flag_sets = [
        OpenFlags::read_write(),
        OpenFlags::create(),
        OpenFlags::overwrite(),
        OpenFlags::read_only().with_append(),
    ];
    for flags in write_flag_sets {
        let err = fs.open_file("/d", flags, 0o644).unwrap_err();
        assert!(err.is_folder_error(), "{:?} should be IsFolder", flags);
    }
    assert!(fs.open_file("/d", OpenFlags::read_only(), 0).unwrap().is_folder());
}

#[test]
fn paths_are_cleaned() {
    let (fs, _temp) = user_filesystem();
    fs.mkdir("a", 0o755).unwrap();
    fs.mkdir("//a/./b/", 0o755).unwrap();
    assert_eq!(fs.stat("/a/b/../b").unwrap().name, "b");
    assert!(fs.stat("/a/b").unwrap().is_dir);
}

#[test]
fn stat_root_and_folder_modes() {
    let (fs, _temp) = user_filesystem();
    let root = fs.stat("/").unwrap();
    assert!(root.is_dir);
    assert_eq!(root.mode, MODE_DIR | 0o700);
    assert_eq!(root.id, fs.root());
}

#[test]
fn append_then_truncate() {
    let (fs, _temp) = user_filesystem();
    let mut h = fs.open_file("/log", OpenFlags::create(), 0o644).unwrap();
    h.write(b"one\n").unwrap();
    h.close().unwrap();

    let mut h = fs
        .open_file("/log", OpenFlags::create().with_append(), 0o644)
        .unwrap();
    h.write(b"two\n").unwrap();
    h.close().unwrap();
    assert_eq!(fs.stat("/log").unwrap().size, 8);

    let h = fs.open_file("/log", OpenFlags::overwrite(), 0o644).unwrap();
    h.close().unwrap();
    assert_eq!(fs.stat("/log").unwrap().size, 0);
}

#[test]
fn seek_within_file() {
    let (fs, _temp) = user_filesystem();
    let mut h = fs.open_file("/f", OpenFlags::create(), 0o644).unwrap();
    h.write(b"0123456789").unwrap();
    assert_eq!(h.seek(SeekFrom::Start(4)).unwrap(), 4);
    let mut buf = [0u8; 3];
    assert_eq!(h.read(&mut buf).unwrap(), 3);
    assert_eq!(&buf, b"456");
}

#[test]
fn rename_across_folders_and_back() {
    let (fs, _temp) = user_filesystem();
    fs.mkdir("/a", 0o755).unwrap();
    fs.mkdir("/b", 0o755).unwrap();
    fs.mkdir("/a/sub", 0o755).unwrap();
    fs.open_file("/a/sub/f", OpenFlags::create(), 0o644).unwrap();

    fs.rename("/a/sub", "/b/moved").unwrap();
    assert!(fs.stat("/b/moved/f").is_ok());
    assert!(fs.stat("/a/sub").unwrap_err().is_not_exist());

    fs.rename("/b/moved", "/a/sub").unwrap();
    assert!(fs.stat("/a/sub/f").is_ok());
}

#[test]
fn rename_missing_source() {
    let (fs, _temp) = user_filesystem();
    fs.mkdir("/b", 0o755).unwrap();
    match fs.rename("/ghost", "/b/ghost").unwrap_err() {
        FsError::NotExist { path, .. } => assert_eq!(path, "/ghost"),
        other => panic!("expected NotExist, got {:?}", other),
    }
}

#[test]
fn errors_convert_to_io_kinds() {
    let (fs, _temp) = user_filesystem();
    let err: std::io::Error = fs.stat("/nope").unwrap_err().into();
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);

    fs.mkdir("/x", 0o755).unwrap();
    let err: std::io::Error = fs.mkdir("/x", 0o755).unwrap_err().into();
    assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
}
