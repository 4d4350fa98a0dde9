//! Snapshot Tests
//!
//! These tests verify:
//! - Save/load restores every record and its content-type
//! - Counters on a loaded store match its content
//! - Corrupted or foreign files are refused without a partial store
//! - A failed save leaves the previous snapshot in place
//! - Saves taken during concurrent writes and deletes stay loadable

use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use nabiakv::persistence::{self, decode_snapshot, encode_snapshot, SnapshotEntry, HEADER_SIZE, MAGIC};
use nabiakv::{NabiaError, Record, Store};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn populated_store() -> Store {
    let store = Store::new();
    store.write("/A", Some(b"Value_A"), "text/plain; charset=UTF-8").unwrap();
    store.write("/B", Some(b"{\"b\":true}"), "application/json").unwrap();
    store.write("/empty", Some(b""), "application/octet-stream").unwrap();
    store
}

// =============================================================================
// Save/Load Tests
// =============================================================================

#[test]
fn test_save_and_load() {
    let temp_dir = TempDir::new().unwrap();
    let location = temp_dir.path().join("snapshot.db");

    let store = populated_store();
    store.save(&location).unwrap();
    assert!(store.stats().last_save.is_some());

    let loaded = persistence::load(&location).unwrap();

    assert_eq!(loaded.len(), 3);
    assert_eq!(
        loaded.read("/A").unwrap(),
        Record::new(b"Value_A".to_vec(), "text/plain; charset=UTF-8")
    );
    assert_eq!(
        loaded.read("/B").unwrap(),
        Record::new(b"{\"b\":true}".to_vec(), "application/json")
    );
    assert!(loaded.read("/empty").unwrap().payload().is_empty());
}

#[test]
fn test_loaded_store_counters_match_content() {
    let temp_dir = TempDir::new().unwrap();
    let location = temp_dir.path().join("snapshot.db");

    populated_store().save(&location).unwrap();
    let loaded = persistence::load(&location).unwrap();

    let stats = loaded.stats();
    assert_eq!(stats.size, 3);
    assert_eq!(stats.writes, 3);
    assert!(stats.last_load.is_some());
    assert_eq!(loaded.location(), Some(location.as_path()));
}

#[test]
fn test_save_empty_store() {
    let temp_dir = TempDir::new().unwrap();
    let location = temp_dir.path().join("empty.db");

    Store::new().save(&location).unwrap();
    let loaded = persistence::load(&location).unwrap();

    assert!(loaded.is_empty());
    assert_eq!(loaded.stats().size, 0);
}

#[test]
fn test_save_overwrites_existing_file() {
    let temp_dir = TempDir::new().unwrap();
    let location = temp_dir.path().join("snapshot.db");

    populated_store().save(&location).unwrap();

    let smaller = Store::new();
    smaller.write("/only", Some(b"one"), "text/plain").unwrap();
    smaller.save(&location).unwrap();

    let loaded = persistence::load(&location).unwrap();
    assert_eq!(loaded.keys(), vec!["/only".to_string()]);
}

#[test]
fn test_save_leaves_no_temp_file() {
    let temp_dir = TempDir::new().unwrap();
    let location = temp_dir.path().join("snapshot.db");

    populated_store().save(&location).unwrap();

    let names: Vec<_> = fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("snapshot.db")]);
}

#[test]
fn test_deleted_keys_are_not_saved() {
    let temp_dir = TempDir::new().unwrap();
    let location = temp_dir.path().join("snapshot.db");

    let store = populated_store();
    store.delete("/A");
    store.save(&location).unwrap();

    let loaded = persistence::load(&location).unwrap();
    assert!(!loaded.exists("/A"));
    assert_eq!(loaded.stats().size, 2);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_load_missing_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = persistence::load(&temp_dir.path().join("missing.db"));
    assert!(matches!(result, Err(NabiaError::Io(_))));
}

#[test]
fn test_save_to_missing_directory_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let location = temp_dir.path().join("no-such-dir").join("snapshot.db");

    let store = populated_store();
    let result = store.save(&location);

    assert!(matches!(result, Err(NabiaError::Io(_))));
    assert!(store.stats().last_save.is_none());
}

#[test]
fn test_failed_save_keeps_previous_snapshot() {
    let temp_dir = TempDir::new().unwrap();
    let location = temp_dir.path().join("snapshot.db");

    populated_store().save(&location).unwrap();
    let before = fs::read(&location).unwrap();

    // A directory where the temp file should go makes the save fail
    fs::create_dir(temp_dir.path().join("snapshot.db.tmp")).unwrap();
    let result = Store::new().save(&location);

    assert!(matches!(result, Err(NabiaError::Io(_))));
    assert_eq!(fs::read(&location).unwrap(), before);
}

#[test]
fn test_load_empty_file_is_protocol_error() {
    let temp_dir = TempDir::new().unwrap();
    let location = temp_dir.path().join("empty.db");
    fs::write(&location, b"").unwrap();

    let result = persistence::load(&location);
    assert!(matches!(result, Err(NabiaError::Protocol(_))));
}

#[test]
fn test_load_foreign_file_is_protocol_error() {
    let temp_dir = TempDir::new().unwrap();
    let location = temp_dir.path().join("foreign.db");
    fs::write(&location, b"this is definitely not a snapshot file").unwrap();

    let result = persistence::load(&location);
    assert!(matches!(result, Err(NabiaError::Protocol(_))));
}

#[test]
fn test_load_corrupted_body_is_protocol_error() {
    let temp_dir = TempDir::new().unwrap();
    let location = temp_dir.path().join("snapshot.db");

    populated_store().save(&location).unwrap();
    let mut bytes = fs::read(&location).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    fs::write(&location, &bytes).unwrap();

    let result = persistence::load(&location);
    assert!(matches!(result, Err(NabiaError::Protocol(ref msg)) if msg.contains("CRC")));
}

#[test]
fn test_load_truncated_file_is_protocol_error() {
    let temp_dir = TempDir::new().unwrap();
    let location = temp_dir.path().join("snapshot.db");

    populated_store().save(&location).unwrap();
    let bytes = fs::read(&location).unwrap();
    fs::write(&location, &bytes[..bytes.len() - 3]).unwrap();

    let result = persistence::load(&location);
    assert!(matches!(result, Err(NabiaError::Protocol(ref msg)) if msg.contains("length")));
}

#[test]
fn test_load_refuses_invalid_record() {
    // Well-formed snapshot carrying a record the store would never accept
    let entries = vec![
        SnapshotEntry {
            key: "/ok".to_string(),
            record: Record::new(b"fine".to_vec(), "text/plain"),
        },
        SnapshotEntry {
            key: "/bad".to_string(),
            record: Record::new(b"oops".to_vec(), "not-a-type"),
        },
    ];
    let bytes = encode_snapshot(&entries).unwrap();

    let temp_dir = TempDir::new().unwrap();
    let location = temp_dir.path().join("snapshot.db");
    fs::write(&location, &bytes).unwrap();

    let result = persistence::load(&location);
    assert!(matches!(result, Err(NabiaError::Protocol(_))));
}

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_snapshot_header() {
    let entries = vec![SnapshotEntry {
        key: "k".to_string(),
        record: Record::new(b"v".to_vec(), "text/plain"),
    }];
    let bytes = encode_snapshot(&entries).unwrap();

    assert_eq!(&bytes[0..4], MAGIC);
    assert_eq!(bytes[4], 1);
    let body_len = u64::from_le_bytes(bytes[9..17].try_into().unwrap());
    assert_eq!(body_len as usize, bytes.len() - HEADER_SIZE);

    assert_eq!(decode_snapshot(&bytes).unwrap(), entries);
}

#[test]
fn test_snapshot_unknown_format_version() {
    let mut bytes = encode_snapshot(&[]).unwrap();
    bytes[4] = 9;

    let result = decode_snapshot(&bytes);
    assert!(matches!(result, Err(NabiaError::Protocol(ref msg)) if msg.contains("version")));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_save_during_concurrent_writes_and_deletes() {
    let temp_dir = TempDir::new().unwrap();
    let location = temp_dir.path().join("snapshot.db");

    let store = Arc::new(Store::new());
    let done = Arc::new(AtomicBool::new(false));
    let key_count = 400;
    let threads = 4;

    // Keeps saving until the writers finish; writers must make progress
    // while saves are in flight
    let saver = {
        let store = Arc::clone(&store);
        let done = Arc::clone(&done);
        let location = location.clone();
        thread::spawn(move || {
            let mut saves = 0;
            while !done.load(Ordering::Relaxed) || saves == 0 {
                store.save(&location).unwrap();
                saves += 1;

                let loaded = persistence::load(&location).unwrap();
                assert_eq!(loaded.stats().size, loaded.len() as i64);
                for key in loaded.keys() {
                    let record = loaded.read(&key).unwrap();
                    assert_eq!(record.content_type(), "text/plain");
                    assert!(record.payload().starts_with(key.as_bytes()));
                }
            }
            saves
        })
    };

    let writers: Vec<_> = (0..threads)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in (t..key_count).step_by(threads) {
                    let key = format!("/key-{}", i);
                    let value = format!("{}:{}", key, i);
                    store.write(&key, Some(value.as_bytes()), "text/plain").unwrap();
                    if i % 4 == 0 {
                        store.delete(&key);
                    }
                }
            })
        })
        .collect();

    for writer in writers {
        writer.join().unwrap();
    }
    done.store(true, Ordering::Relaxed);
    assert!(saver.join().unwrap() > 0);

    store.save(&location).unwrap();
    let loaded = persistence::load(&location).unwrap();
    let survivors = (0..key_count).filter(|i| i % 4 != 0).count();
    assert_eq!(loaded.len(), survivors);
    assert_eq!(loaded.stats().size, survivors as i64);
    assert_eq!(store.stats().size, survivors as i64);
}
