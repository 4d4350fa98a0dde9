//! Store Module
//!
//! The concurrent key → record table.
//!
//! ## Responsibilities
//! - Thread-safe exists/read/write/delete over the record table
//! - Validate keys, values and content-types before any mutation
//! - Maintain usage counters and last-access timestamps
//! - Hand the table to the persistence layer for snapshots

use std::path::{Path, PathBuf};

use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};

use crate::error::{NabiaError, Result};
use crate::persistence;
use crate::record::{content_type, Record};
use crate::stats::{Stats, StatsSnapshot};

/// An in-memory record store
///
/// ## Concurrency Model
///
/// - **Records**: `DashMap` shards the table; an operation only locks the
///   shard owning its key, so unrelated keys never block each other
/// - **Counters**: plain atomics, updated without a lock
/// - **Snapshots**: `save_lock` serializes saves from this store; it is never
///   taken by exists/read/write/delete
///
/// Per key, writes and deletes are linearizable. Across keys there is no
/// ordering guarantee.
pub struct Store {
    /// The record table
    records: DashMap<String, Record>,

    /// Usage counters and timestamps
    stats: Stats,

    /// Where `stop()` writes the final snapshot
    location: Option<PathBuf>,

    /// Serializes snapshot saves
    save_lock: Mutex<()>,
}

impl Store {
    /// Create an empty store with no snapshot location
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            stats: Stats::new(),
            location: None,
            save_lock: Mutex::new(()),
        }
    }

    /// Create an empty store that saves to `location` on stop
    pub fn with_location(location: impl Into<PathBuf>) -> Self {
        Self {
            location: Some(location.into()),
            ..Self::new()
        }
    }

    /// Load the snapshot at `location`, or create one if none exists
    ///
    /// A fresh store writes an empty snapshot immediately so that the
    /// location is known to be writable before any data arrives.
    pub fn open(location: impl AsRef<Path>) -> Result<Self> {
        let location = location.as_ref();
        if location.as_os_str().is_empty() {
            return Err(NabiaError::Config("location cannot be empty".to_string()));
        }

        if location.exists() {
            tracing::info!("Loading snapshot from {}", location.display());
            return persistence::load(location);
        }

        tracing::info!("No snapshot at {}, creating a new one", location.display());
        let store = Self::with_location(location);
        store.save(location)?;
        Ok(store)
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// Check whether a key is present
    ///
    /// An empty key is never present and is not counted as a read.
    pub fn exists(&self, key: &str) -> bool {
        if key.is_empty() {
            return false;
        }
        self.stats.record_read();
        self.records.contains_key(key)
    }

    /// Get the record stored under `key`
    pub fn read(&self, key: &str) -> Result<Record> {
        if key.is_empty() {
            return Err(NabiaError::InvalidKey);
        }
        self.stats.record_read();
        self.records
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| NabiaError::NotFound(key.to_string()))
    }

    /// Store a record under `key`, replacing any previous one
    ///
    /// Validation order: key, payload, content-type presence, content-type
    /// shape. There is no create-only or update-only mode; callers that need
    /// one must check `exists()` first and accept the race that implies.
    pub fn write(&self, key: &str, payload: Option<&[u8]>, content_type: &str) -> Result<()> {
        if key.is_empty() {
            return Err(NabiaError::InvalidKey);
        }
        let payload = payload.ok_or(NabiaError::InvalidValue)?;
        if content_type.is_empty() {
            return Err(NabiaError::InvalidContentType(
                "content-type cannot be empty".to_string(),
            ));
        }
        content_type::validate(content_type)?;

        self.stats.record_write();

        // The insert reports the previous value under the shard lock, so the
        // size check and the store are one step
        let previous = self
            .records
            .insert(key.to_string(), Record::new(payload, content_type));
        if previous.is_none() {
            self.stats.increment_size();
        }

        Ok(())
    }

    /// Remove `key`; removing an absent key is a no-op
    ///
    /// Always counts as a write, even when nothing was removed.
    pub fn delete(&self, key: &str) {
        if self.records.remove(key).is_some() {
            self.stats.decrement_size();
        }
        self.stats.record_write();
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Write a snapshot of the store to `location`
    pub fn save(&self, location: impl AsRef<Path>) -> Result<()> {
        persistence::save(self, location.as_ref())
    }

    /// Final save to the configured location
    ///
    /// Intended as the last call before the owning process exits. A store
    /// without a location has nothing to save.
    pub fn stop(&self) -> Result<()> {
        match &self.location {
            Some(location) => {
                tracing::info!("Saving {} records to {}", self.len(), location.display());
                self.save(location)
            }
            None => {
                tracing::debug!("Store has no location, skipping final save");
                Ok(())
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Counters and timestamps at this instant
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Number of live entries in the table
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All keys currently present, in no particular order
    pub fn keys(&self) -> Vec<String> {
        self.records.iter().map(|entry| entry.key().clone()).collect()
    }

    /// The snapshot location `stop()` saves to
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    pub(crate) fn records(&self) -> &DashMap<String, Record> {
        &self.records
    }

    pub(crate) fn counters(&self) -> &Stats {
        &self.stats
    }

    pub(crate) fn lock_for_save(&self) -> MutexGuard<'_, ()> {
        self.save_lock.lock()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
