//! Tests for SnapshotReader
//!
//! These tests verify:
//! - Point lookups map absence to `None`
//! - Iteration order, column family filtering and restartability
//! - Snapshot isolation against later commits
//! - Misuse after close is rejected

use cfkv::{Config, Modification, Storage, StorageError, CF_DEFAULT, CF_LOCK, CF_WRITE};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_storage() -> (TempDir, Storage) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .scan_batch_size(2) // Small batches so iteration crosses refills
        .build();
    let storage = Storage::open(config).unwrap();
    (temp_dir, storage)
}

fn put(cf: &str, key: &str, value: &str) -> Modification {
    Modification::put(cf, key.as_bytes(), value.as_bytes())
}

fn collect_cf(storage: &Storage, cf: &str) -> Vec<(String, String)> {
    let reader = storage.new_reader().unwrap();
    reader
        .iter(cf)
        .unwrap()
        .map(|pair| {
            let (k, v) = pair.unwrap();
            (String::from_utf8(k).unwrap(), String::from_utf8(v).unwrap())
        })
        .collect()
}

// =============================================================================
// Point Lookup Tests
// =============================================================================

#[test]
fn test_get_missing_key_is_none() {
    let (_temp, storage) = setup_temp_storage();
    let reader = storage.new_reader().unwrap();

    assert_eq!(reader.get(CF_DEFAULT, b"missing").unwrap(), None);
}

#[test]
fn test_get_empty_value_is_not_absent() {
    let (_temp, storage) = setup_temp_storage();
    storage.write_batch([put(CF_DEFAULT, "empty", "")]).unwrap();

    let reader = storage.new_reader().unwrap();
    assert_eq!(reader.get(CF_DEFAULT, b"empty").unwrap(), Some(Vec::new()));
}

#[test]
fn test_get_empty_key() {
    let (_temp, storage) = setup_temp_storage();
    storage
        .write_batch([put(CF_DEFAULT, "", "root"), put(CF_DEFAULT, "a", "1")])
        .unwrap();

    let reader = storage.new_reader().unwrap();
    assert_eq!(reader.get(CF_DEFAULT, b"").unwrap(), Some(b"root".to_vec()));
    assert_eq!(collect_cf(&storage, CF_DEFAULT)[0], ("".to_string(), "root".to_string()));
}

#[test]
fn test_get_invalid_cf() {
    let (_temp, storage) = setup_temp_storage();
    let reader = storage.new_reader().unwrap();

    assert!(matches!(
        reader.get("bad_cf", b"k"),
        Err(StorageError::InvalidColumnFamily { .. })
    ));
}

// =============================================================================
// Iteration Tests
// =============================================================================

#[test]
fn test_iter_is_sorted_and_scoped() {
    let (_temp, storage) = setup_temp_storage();
    storage
        .write_batch([
            put(CF_WRITE, "m", "w"),
            put(CF_DEFAULT, "c", "3"),
            put(CF_LOCK, "b", "l"),
            put(CF_DEFAULT, "a", "1"),
            put(CF_DEFAULT, "e", "5"),
            put(CF_DEFAULT, "b", "2"),
            put("defaults", "z", "other family"),
        ])
        .unwrap();

    let pairs = collect_cf(&storage, CF_DEFAULT);
    let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["a", "b", "c", "e"]);

    assert_eq!(collect_cf(&storage, CF_LOCK), vec![("b".to_string(), "l".to_string())]);
    assert_eq!(collect_cf(&storage, CF_WRITE), vec![("m".to_string(), "w".to_string())]);
}

#[test]
fn test_iter_empty_cf() {
    let (_temp, storage) = setup_temp_storage();
    storage.write_batch([put(CF_DEFAULT, "a", "1")]).unwrap();

    assert!(collect_cf(&storage, CF_LOCK).is_empty());
}

#[test]
fn test_iter_is_restartable() {
    let (_temp, storage) = setup_temp_storage();
    storage
        .write_batch((0..7).map(|i| put(CF_DEFAULT, &format!("k{}", i), "v")))
        .unwrap();

    let reader = storage.new_reader().unwrap();
    let first: Vec<_> = reader.iter(CF_DEFAULT).unwrap().map(|p| p.unwrap()).collect();
    let second: Vec<_> = reader.iter(CF_DEFAULT).unwrap().map(|p| p.unwrap()).collect();

    assert_eq!(first.len(), 7);
    assert_eq!(first, second);
}

#[test]
fn test_iter_from_seeks_within_cf() {
    let (_temp, storage) = setup_temp_storage();
    storage
        .write_batch([
            put(CF_DEFAULT, "apple", "1"),
            put(CF_DEFAULT, "banana", "2"),
            put(CF_DEFAULT, "cherry", "3"),
            put(CF_WRITE, "zebra", "w"),
        ])
        .unwrap();

    let reader = storage.new_reader().unwrap();
    let keys: Vec<Vec<u8>> = reader
        .iter_from(CF_DEFAULT, b"b")
        .unwrap()
        .map(|p| p.unwrap().0)
        .collect();
    assert_eq!(keys, vec![b"banana".to_vec(), b"cherry".to_vec()]);

    let past_end: Vec<_> = reader.iter_from(CF_DEFAULT, b"z").unwrap().collect();
    assert!(past_end.is_empty());
}

// =============================================================================
// Isolation Tests
// =============================================================================

#[test]
fn test_reader_does_not_see_later_commits() {
    let (_temp, storage) = setup_temp_storage();
    storage.write_batch([put(CF_DEFAULT, "a", "old")]).unwrap();

    let reader = storage.new_reader().unwrap();

    storage
        .write_batch([
            put(CF_DEFAULT, "a", "new"),
            put(CF_DEFAULT, "b", "added"),
        ])
        .unwrap();

    assert_eq!(reader.get(CF_DEFAULT, b"a").unwrap(), Some(b"old".to_vec()));
    assert_eq!(reader.get(CF_DEFAULT, b"b").unwrap(), None);
    let keys: Vec<Vec<u8>> = reader
        .iter(CF_DEFAULT)
        .unwrap()
        .map(|p| p.unwrap().0)
        .collect();
    assert_eq!(keys, vec![b"a".to_vec()]);

    let fresh = storage.new_reader().unwrap();
    assert_eq!(fresh.get(CF_DEFAULT, b"a").unwrap(), Some(b"new".to_vec()));
    assert_eq!(fresh.get(CF_DEFAULT, b"b").unwrap(), Some(b"added".to_vec()));
}

#[test]
fn test_iteration_unaffected_by_commit_mid_scan() {
    let (_temp, storage) = setup_temp_storage();
    storage
        .write_batch((0..6).map(|i| put(CF_DEFAULT, &format!("k{}", i), "v")))
        .unwrap();

    let reader = storage.new_reader().unwrap();
    let mut iter = reader.iter(CF_DEFAULT).unwrap();
    let first = iter.next().unwrap().unwrap();
    assert_eq!(first.0, b"k0".to_vec());

    storage
        .write_batch([
            Modification::delete(CF_DEFAULT, b"k3".to_vec()),
            put(CF_DEFAULT, "k35", "inserted"),
        ])
        .unwrap();

    let rest: Vec<Vec<u8>> = iter.map(|p| p.unwrap().0).collect();
    assert_eq!(
        rest,
        vec![b"k1".to_vec(), b"k2".to_vec(), b"k3".to_vec(), b"k4".to_vec(), b"k5".to_vec()]
    );
}

// =============================================================================
// Close Tests
// =============================================================================

#[test]
fn test_use_after_close_fails() {
    let (_temp, storage) = setup_temp_storage();
    storage.write_batch([put(CF_DEFAULT, "a", "1")]).unwrap();

    let mut reader = storage.new_reader().unwrap();
    assert!(!reader.is_closed());
    reader.close();

    assert!(reader.is_closed());
    assert!(matches!(reader.get(CF_DEFAULT, b"a"), Err(StorageError::ReaderClosed)));
    assert!(matches!(reader.iter(CF_DEFAULT), Err(StorageError::ReaderClosed)));
    assert!(matches!(
        reader.iter_from(CF_DEFAULT, b"a"),
        Err(StorageError::ReaderClosed)
    ));
}

#[test]
fn test_close_is_idempotent() {
    let (_temp, storage) = setup_temp_storage();
    let mut reader = storage.new_reader().unwrap();

    reader.close();
    reader.close();
    assert!(reader.is_closed());
}
