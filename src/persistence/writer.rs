//! Snapshot Writer
//!
//! Saves a store to disk all-or-nothing: the snapshot is written to a
//! sibling temp file, synced, then renamed over the target.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::store::Store;

use super::snapshot::{encode_snapshot, SnapshotEntry};

/// Write a snapshot of `store` to `location`, replacing any existing file
///
/// Saves from the same store are serialized; reads and writes on the store
/// continue while the table is copied.
pub fn save(store: &Store, location: &Path) -> Result<()> {
    let _save_guard = store.lock_for_save();

    // Copy out under per-shard read locks only
    let entries: Vec<SnapshotEntry> = store
        .records()
        .iter()
        .map(|entry| SnapshotEntry {
            key: entry.key().clone(),
            record: entry.value().clone(),
        })
        .collect();

    let bytes = encode_snapshot(&entries)?;
    let temp_path = temp_path(location)?;

    if let Err(e) = write_synced(&temp_path, &bytes) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    if let Err(e) = fs::rename(&temp_path, location) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    store.counters().record_save();

    tracing::debug!(
        "Saved snapshot of {} entries ({} bytes) to {}",
        entries.len(),
        bytes.len(),
        location.display()
    );

    Ok(())
}

/// `<location>.tmp` next to the target, so the rename stays on one filesystem
fn temp_path(location: &Path) -> io::Result<PathBuf> {
    let file_name = location.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a file path", location.display()),
        )
    })?;

    let mut temp_name = OsString::from(file_name);
    temp_name.push(".tmp");
    Ok(location.with_file_name(temp_name))
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;

    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;

    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()
}
