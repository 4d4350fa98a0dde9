//! Snapshot Reader
//!
//! Rebuilds a store from a snapshot file.

use std::fs;
use std::path::Path;

use crate::error::{NabiaError, Result};
use crate::store::Store;

use super::snapshot::decode_snapshot;

/// Load the snapshot at `location` into a new store
///
/// Every entry goes through `Store::write`, so counters match the loaded
/// content and invalid records are refused. The returned store saves back
/// to `location` on stop. On any failure no store is returned.
pub fn load(location: &Path) -> Result<Store> {
    let bytes = fs::read(location)?;
    let entries = decode_snapshot(&bytes)?;

    let store = Store::with_location(location);
    for entry in &entries {
        store
            .write(&entry.key, Some(entry.record.payload()), entry.record.content_type())
            .map_err(|e| {
                NabiaError::Protocol(format!("Invalid snapshot entry {:?}: {}", entry.key, e))
            })?;
    }

    store.counters().record_load();

    tracing::debug!(
        "Loaded {} entries from {}",
        entries.len(),
        location.display()
    );

    Ok(store)
}
