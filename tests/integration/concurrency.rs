use bms::{FileSystem, OpenFlags};
use std::collections::BTreeSet;
use std::sync::{Arc, Barrier};
use std::thread;

use crate::integration::support::user_filesystem;

#[test]
fn concurrent_creates_in_one_folder_all_land() {
    const WRITERS: usize = 32;
    let (fs, _temp) = user_filesystem();
    fs.mkdir("/shared", 0o755).unwrap();
    let barrier = Arc::new(Barrier::new(WRITERS));

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let fs = fs.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                let path = format!("/shared/file-{:02}", i);
                fs.open_file(&path, OpenFlags::create(), 0o644)
                    .and_then(|h| h.close())
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let listing = fs.read_dir("/shared", 0).unwrap();
    assert!(listing.is_complete());
    let names: BTreeSet<_> = listing.names().into_iter().map(String::from).collect();
    let expected: BTreeSet<_> = (0..WRITERS).map(|i| format!("file-{:02}", i)).collect();
    assert_eq!(names, expected);
}

#[test]
fn concurrent_creates_of_one_name_yield_one_entry() {
    const WRITERS: usize = 16;
    let (fs, _temp) = user_filesystem();
    let barrier = Arc::new(Barrier::new(WRITERS));

    let handles: Vec<_> = (0..WRITERS)
        .map(|_| {
            let fs = fs.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                fs.open_file("/same", OpenFlags::create(), 0o644)
                    .map(|h| h.stat().map(|info| info.id))
            })
        })
        .collect();

    let ids: BTreeSet<_> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap().unwrap())
        .collect();
    assert_eq!(ids.len(), 1);
    assert_eq!(fs.read_dir("/", 0).unwrap().entries.len(), 1);
}

#[test]
fn opposing_moves_do_not_deadlock() {
    const ROUNDS: usize = 50;
    let (fs, _temp) = user_filesystem();
    fs.mkdir("/left", 0o755).unwrap();
    fs.mkdir("/right", 0o755).unwrap();
    fs.open_file("/left/a", OpenFlags::create(), 0o644).unwrap();
    fs.open_file("/right/b", OpenFlags::create(), 0o644).unwrap();

    let spawn_mover = |from: &'static str, to: &'static str, name: &'static str| {
        let fs = fs.clone();
        thread::spawn(move || {
            for _ in 0..ROUNDS {
                fs.rename(&format!("{}/{}", from, name), &format!("{}/{}", to, name))
                    .unwrap();
                fs.rename(&format!("{}/{}", to, name), &format!("{}/{}", from, name))
                    .unwrap();
            }
        })
    };
    let a = spawn_mover("/left", "/right", "a");
    let b = spawn_mover("/right", "/left", "b");
    a.join().unwrap();
    b.join().unwrap();

    assert!(fs.stat("/left/a").is_ok());
    assert!(fs.stat("/right/b").is_ok());
}

#[test]
fn concurrent_mkdirs_under_distinct_parents() {
    let (fs, _temp) = user_filesystem();
    for p in 0..4 {
        fs.mkdir(&format!("/p{}", p), 0o755).unwrap();
    }
    let handles: Vec<_> = (0..4)
        .flat_map(|p| (0..8).map(move |c| (p, c)))
        .map(|(p, c)| {
            let fs = fs.clone();
            thread::spawn(move || fs.mkdir(&format!("/p{}/c{}", p, c), 0o755))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }
    for p in 0..4 {
        assert_eq!(fs.read_dir(&format!("/p{}", p), 0).unwrap().entries.len(), 8);
    }
}

#[test]
fn crossing_folder_moves_never_orphan_both() {
    for _ in 0..20 {
        let (fs, _temp) = user_filesystem();
        fs.mkdir("/a", 0o755).unwrap();
        fs.mkdir("/x", 0o755).unwrap();
        let barrier = Arc::new(Barrier::new(2));

        let spawn_mover = |from: &'static str, to: &'static str| {
            let fs = fs.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                fs.rename(from, to)
            })
        };
        let first = spawn_mover("/a", "/x/a");
        let second = spawn_mover("/x", "/a/x");
        let outcomes = [first.join().unwrap(), second.join().unwrap()];

        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        let root = fs.read_dir("/", 0).unwrap();
        assert_eq!(root.entries.len(), 1);
        assert!(fs.stat("/a/x").is_ok() || fs.stat("/x/a").is_ok());
    }
}
