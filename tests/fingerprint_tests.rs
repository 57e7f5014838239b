// Tests for the content fingerprinter

use mirsync::sync::fingerprint;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_identical_content_yields_identical_digest() {
    let tmp = tempdir().unwrap();
    let a = tmp.path().join("a.bin");
    let b = tmp.path().join("b.bin");
    fs::write(&a, b"hello world").unwrap();
    fs::write(&b, b"hello world").unwrap();

    assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
}

#[test]
fn test_any_byte_difference_changes_the_digest() {
    let tmp = tempdir().unwrap();
    let a = tmp.path().join("a.bin");
    let b = tmp.path().join("b.bin");
    fs::write(&a, b"hello world").unwrap();
    fs::write(&b, b"hello worle").unwrap();

    assert_ne!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
}

#[test]
fn test_digest_is_fixed_length_hex() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("file.txt");
    fs::write(&file, b"content").unwrap();

    let digest = fingerprint(&file).unwrap();
    assert_eq!(digest.len(), 64);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_file_larger_than_read_buffer_is_hashed_fully() {
    // 200 KB spans several 64 KB reads; flipping a byte in the final chunk
    // must still change the digest.
    let tmp = tempdir().unwrap();
    let a = tmp.path().join("a.bin");
    let b = tmp.path().join("b.bin");

    let data = vec![0xabu8; 200_000];
    fs::write(&a, &data).unwrap();

    let mut tweaked = data.clone();
    tweaked[199_999] = 0xac;
    fs::write(&b, &tweaked).unwrap();

    assert_ne!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
}

#[test]
fn test_empty_files_share_a_digest() {
    let tmp = tempdir().unwrap();
    let a = tmp.path().join("a.bin");
    let b = tmp.path().join("b.bin");
    fs::write(&a, b"").unwrap();
    fs::write(&b, b"").unwrap();

    assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
}

#[test]
fn test_missing_file_is_an_error() {
    let tmp = tempdir().unwrap();
    let result = fingerprint(&tmp.path().join("no_such_file"));
    assert!(result.is_err());
}
