// Tests for the replica snapshot

use mirsync::logging::{ColorMode, SyncLogger};
use mirsync::sync::{capture_replica_state, EntryKind};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn test_logger(dir: &Path) -> SyncLogger {
    SyncLogger::new(&dir.join("sync.log"), true, ColorMode::Never).unwrap()
}

#[test]
fn test_missing_replica_is_created_with_an_empty_snapshot() {
    let tmp = tempdir().unwrap();
    let replica = tmp.path().join("replica");
    let logger = test_logger(tmp.path());

    let state = capture_replica_state(&replica, &logger).unwrap();

    assert!(state.is_empty());
    assert!(replica.is_dir());

    let log = fs::read_to_string(tmp.path().join("sync.log")).unwrap();
    assert!(log.contains("Created replica folder"));
}

#[test]
fn test_snapshot_records_files_with_hashes_and_directories_without() {
    let tmp = tempdir().unwrap();
    let replica = tmp.path().join("replica");
    fs::create_dir_all(replica.join("sub")).unwrap();
    fs::write(replica.join("a.txt"), b"hi").unwrap();
    fs::write(replica.join("sub").join("b.txt"), b"x").unwrap();

    let logger = test_logger(tmp.path());
    let state = capture_replica_state(&replica, &logger).unwrap();

    assert_eq!(state.len(), 3);

    let file = state.get(Path::new("a.txt")).unwrap();
    assert_eq!(file.kind, EntryKind::File);
    assert!(!file.checked);
    assert!(file.content_hash.is_some());

    let dir = state.get(Path::new("sub")).unwrap();
    assert_eq!(dir.kind, EntryKind::Directory);
    assert!(!dir.checked);
    assert!(dir.content_hash.is_none());

    let nested = state.get(&Path::new("sub").join("b.txt")).unwrap();
    assert_eq!(nested.kind, EntryKind::File);
}

#[test]
fn test_snapshot_keys_are_relative_to_the_replica_root() {
    let tmp = tempdir().unwrap();
    let replica = tmp.path().join("replica");
    fs::create_dir_all(replica.join("a").join("b").join("c")).unwrap();
    fs::write(replica.join("a").join("b").join("c").join("deep.txt"), b"d").unwrap();

    let logger = test_logger(tmp.path());
    let state = capture_replica_state(&replica, &logger).unwrap();

    let key = Path::new("a").join("b").join("c").join("deep.txt");
    assert!(state.contains_key(&key));
    // no key carries the replica root prefix
    assert!(state.keys().all(|k| k.is_relative()));
}

#[test]
fn test_identical_files_share_the_same_snapshot_hash() {
    let tmp = tempdir().unwrap();
    let replica = tmp.path().join("replica");
    fs::create_dir_all(&replica).unwrap();
    fs::write(replica.join("one.txt"), b"same bytes").unwrap();
    fs::write(replica.join("two.txt"), b"same bytes").unwrap();

    let logger = test_logger(tmp.path());
    let state = capture_replica_state(&replica, &logger).unwrap();

    let one = state.get(Path::new("one.txt")).unwrap();
    let two = state.get(Path::new("two.txt")).unwrap();
    assert_eq!(one.content_hash, two.content_hash);
}
