//! Tests for Store
//!
//! These tests verify:
//! - Basic exists/read/write/delete operations
//! - Validation order and error kinds
//! - Counter and timestamp bookkeeping
//! - Concurrent access patterns
//! - Lifecycle (open/stop)

use std::sync::Arc;
use std::thread;

use nabiakv::{NabiaError, Record, Store};
use tempfile::TempDir;

const TEXT_UTF8: &str = "text/plain; charset=UTF-8";
const JSON_UTF8: &str = "application/json; charset=UTF-8";

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_write_then_read() {
    let store = Store::new();

    store.write("/A", Some(b"Value_A"), TEXT_UTF8).unwrap();
    let record = store.read("/A").unwrap();

    assert_eq!(record.payload(), b"Value_A");
    assert_eq!(record.content_type(), TEXT_UTF8);
}

#[test]
fn test_overwrite_replaces_value_and_content_type() {
    let store = Store::new();

    store.write("/A", Some(b"Value_A"), TEXT_UTF8).unwrap();
    let size_before = store.stats().size;

    store.write("/A", Some(b"Modified value"), JSON_UTF8).unwrap();
    let record = store.read("/A").unwrap();

    assert_eq!(record, Record::new(b"Modified value".to_vec(), JSON_UTF8));
    assert_eq!(store.stats().size, size_before);
    assert_eq!(store.stats().size, 1);
}

#[test]
fn test_same_write_twice_keeps_structure() {
    let store = Store::new();

    store.write("k", Some(b"v"), "text/plain").unwrap();
    store.write("k", Some(b"v"), "text/plain").unwrap();

    assert!(store.exists("k"));
    assert_eq!(store.read("k").unwrap(), Record::new(b"v".to_vec(), "text/plain"));
    assert_eq!(store.stats().size, 1);
    assert_eq!(store.stats().writes, 2);
}

#[test]
fn test_empty_payload_is_allowed() {
    let store = Store::new();

    store.write("empty", Some(b""), "application/octet-stream").unwrap();

    assert!(store.read("empty").unwrap().payload().is_empty());
}

#[test]
fn test_read_missing_key() {
    let store = Store::new();

    let result = store.read("missing");

    assert!(matches!(result, Err(NabiaError::NotFound(ref key)) if key == "missing"));
}

#[test]
fn test_exists() {
    let store = Store::new();

    assert!(!store.exists("k"));
    store.write("k", Some(b"v"), "text/plain").unwrap();
    assert!(store.exists("k"));
}

#[test]
fn test_delete_is_terminal_and_idempotent() {
    let store = Store::new();

    store.write("k", Some(b"v"), "text/plain").unwrap();
    store.write("other", Some(b"v"), "text/plain").unwrap();
    assert_eq!(store.stats().size, 2);

    store.delete("k");
    assert!(!store.exists("k"));
    assert_eq!(store.stats().size, 1);

    store.delete("k");
    assert!(!store.exists("k"));
    assert_eq!(store.stats().size, 1);
}

#[test]
fn test_delete_missing_key_counts_as_write() {
    let store = Store::new();

    store.delete("never-written");

    let stats = store.stats();
    assert_eq!(stats.writes, 1);
    assert_eq!(stats.size, 0);
    assert!(stats.last_write.is_some());
}

#[test]
fn test_keys_and_len() {
    let store = Store::new();

    store.write("a", Some(b"1"), "text/plain").unwrap();
    store.write("b", Some(b"2"), "text/plain").unwrap();

    let mut keys = store.keys();
    keys.sort();

    assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(store.len(), 2);
    assert!(!store.is_empty());
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_write_empty_key() {
    let store = Store::new();
    let result = store.write("", Some(b"x"), "text/plain");
    assert!(matches!(result, Err(NabiaError::InvalidKey)));
}

#[test]
fn test_write_absent_value() {
    let store = Store::new();
    let result = store.write("k", None, "text/plain");
    assert!(matches!(result, Err(NabiaError::InvalidValue)));
}

#[test]
fn test_write_empty_content_type() {
    let store = Store::new();
    let result = store.write("k", Some(b"x"), "");
    assert!(matches!(result, Err(NabiaError::InvalidContentType(_))));
}

#[test]
fn test_write_malformed_content_type() {
    let store = Store::new();
    let result = store.write("k", Some(b"x"), "not-a-type");
    assert!(matches!(result, Err(NabiaError::InvalidContentType(_))));
}

#[test]
fn test_validation_order() {
    let store = Store::new();

    // Key is checked before value, value before content-type
    assert!(matches!(store.write("", None, ""), Err(NabiaError::InvalidKey)));
    assert!(matches!(store.write("k", None, ""), Err(NabiaError::InvalidValue)));
}

#[test]
fn test_failed_write_changes_nothing() {
    let store = Store::new();
    store.write("k", Some(b"v"), "text/plain").unwrap();

    let before = store.stats();
    let _ = store.write("k", Some(b"other"), "bogus");

    assert_eq!(store.read("k").unwrap().payload(), b"v");
    let after = store.stats();
    assert_eq!(after.writes, before.writes);
    assert_eq!(after.size, before.size);
}

#[test]
fn test_read_empty_key() {
    let store = Store::new();
    assert!(matches!(store.read(""), Err(NabiaError::InvalidKey)));
}

// =============================================================================
// Stats Tests
// =============================================================================

#[test]
fn test_new_store_stats_are_zero() {
    let stats = Store::new().stats();

    assert_eq!(stats.reads, 0);
    assert_eq!(stats.writes, 0);
    assert_eq!(stats.size, 0);
    assert!(stats.last_read.is_none());
    assert!(stats.last_write.is_none());
    assert!(stats.last_save.is_none());
    assert!(stats.last_load.is_none());
}

#[test]
fn test_exists_with_empty_key_is_not_counted() {
    let store = Store::new();

    assert!(!store.exists(""));

    let stats = store.stats();
    assert_eq!(stats.reads, 0);
    assert!(stats.last_read.is_none());
}

#[test]
fn test_reads_are_counted() {
    let store = Store::new();
    store.write("k", Some(b"v"), "text/plain").unwrap();

    store.exists("k");
    store.exists("missing");
    store.read("k").unwrap();
    let _ = store.read("missing");

    let stats = store.stats();
    assert_eq!(stats.reads, 4);
    assert!(stats.last_read.is_some());
}

#[test]
fn test_writes_do_not_count_as_reads() {
    let store = Store::new();

    store.write("k", Some(b"v"), "text/plain").unwrap();
    store.delete("k");

    assert_eq!(store.stats().reads, 0);
    assert_eq!(store.stats().writes, 2);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_write_read_delete() {
    let store = Arc::new(Store::new());
    let key_count = 200;
    let threads = 8;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in (t..key_count).step_by(threads) {
                    let key = format!("/key-{}", i);
                    let value = format!("value-{}", i);
                    store.write(&key, Some(value.as_bytes()), "text/plain").unwrap();
                    let record = store.read(&key).unwrap();
                    assert_eq!(record.payload(), value.as_bytes());

                    // Delete every third key
                    if i % 3 == 0 {
                        store.delete(&key);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let survivors = (0..key_count).filter(|i| i % 3 != 0).count();
    assert_eq!(store.stats().size, survivors as i64);
    assert_eq!(store.len(), survivors);
}

#[test]
fn test_concurrent_overwrites_same_key() {
    let store = Arc::new(Store::new());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..100 {
                    let value = format!("{}-{}", t, i);
                    store.write("shared", Some(value.as_bytes()), "text/plain").unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.stats().size, 1);
    assert_eq!(store.stats().writes, 800);
}

#[test]
fn test_concurrent_readers_see_complete_records() {
    let store = Arc::new(Store::new());
    store.write("k", Some(b"aaaa"), "text/plain").unwrap();

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..500 {
                let (payload, ct) = if i % 2 == 0 {
                    (&b"bbbb"[..], "application/json")
                } else {
                    (&b"aaaa"[..], "text/plain")
                };
                store.write("k", Some(payload), ct).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..500 {
                    let record = store.read("k").unwrap();
                    // Payload and content-type always come from the same write
                    match record.payload() {
                        b"aaaa" => assert_eq!(record.content_type(), "text/plain"),
                        b"bbbb" => assert_eq!(record.content_type(), "application/json"),
                        other => panic!("unexpected payload {:?}", other),
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_open_creates_snapshot_file() {
    let temp_dir = TempDir::new().unwrap();
    let location = temp_dir.path().join("nabia.db");

    let store = Store::open(&location).unwrap();

    assert!(location.exists());
    assert!(store.is_empty());
    assert_eq!(store.location(), Some(location.as_path()));
    assert!(store.stats().last_save.is_some());
}

#[test]
fn test_stop_then_open_restores_data() {
    let temp_dir = TempDir::new().unwrap();
    let location = temp_dir.path().join("nabia.db");

    {
        let store = Store::open(&location).unwrap();
        store.write("/A", Some(b"Value_A"), TEXT_UTF8).unwrap();
        store.write("/B", Some(b"Value_B"), "text/plain").unwrap();
        store.delete("/B");
        store.stop().unwrap();
    }

    let store = Store::open(&location).unwrap();
    assert_eq!(store.read("/A").unwrap().payload(), b"Value_A");
    assert!(!store.exists("/B"));
    assert_eq!(store.stats().size, 1);
    assert!(store.stats().last_load.is_some());
}

#[test]
fn test_stop_without_location_is_noop() {
    let store = Store::new();
    store.write("k", Some(b"v"), "text/plain").unwrap();

    store.stop().unwrap();

    assert!(store.stats().last_save.is_none());
}

#[test]
fn test_open_empty_location() {
    let result = Store::open("");
    assert!(matches!(result, Err(NabiaError::Config(_))));
}
