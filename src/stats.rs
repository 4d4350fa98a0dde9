//! Stats Module
//!
//! Usage counters and last-access markers for a store.
//!
//! All updates are single atomic operations; no lock is taken. Under heavy
//! interleaving on one key the counters may briefly disagree with the map,
//! so treat them as observability data only.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Live counters owned by a store
#[derive(Debug, Default)]
pub struct Stats {
    reads: AtomicU64,
    writes: AtomicU64,
    size: AtomicI64,
    timestamps: Timestamps,
}

/// Last-access instants, stored as unix millis (0 = never)
#[derive(Debug, Default)]
struct Timestamps {
    last_read: AtomicU64,
    last_write: AtomicU64,
    last_save: AtomicU64,
    last_load: AtomicU64,
}

/// Point-in-time copy of a store's counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Cumulative reads (exists and read calls)
    pub reads: u64,

    /// Cumulative writes (write and delete calls)
    pub writes: u64,

    /// Number of live keys
    pub size: i64,

    pub last_read: Option<SystemTime>,
    pub last_write: Option<SystemTime>,
    pub last_save: Option<SystemTime>,
    pub last_load: Option<SystemTime>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a read and stamp last-read
    pub fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.timestamps.last_read.store(now_millis(), Ordering::Relaxed);
    }

    /// Count a write and stamp last-write
    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.timestamps.last_write.store(now_millis(), Ordering::Relaxed);
    }

    pub fn record_save(&self) {
        self.timestamps.last_save.store(now_millis(), Ordering::Relaxed);
    }

    pub fn record_load(&self) {
        self.timestamps.last_load.store(now_millis(), Ordering::Relaxed);
    }

    pub fn increment_size(&self) {
        self.size.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decrement_size(&self) {
        self.size.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn size(&self) -> i64 {
        self.size.load(Ordering::Relaxed)
    }

    /// Copy every counter and timestamp
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            reads: self.reads(),
            writes: self.writes(),
            size: self.size(),
            last_read: from_millis(self.timestamps.last_read.load(Ordering::Relaxed)),
            last_write: from_millis(self.timestamps.last_write.load(Ordering::Relaxed)),
            last_save: from_millis(self.timestamps.last_save.load(Ordering::Relaxed)),
            last_load: from_millis(self.timestamps.last_load.load(Ordering::Relaxed)),
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        // Clock before 1970: still distinguishable from "never"
        .unwrap_or(1)
}

fn from_millis(millis: u64) -> Option<SystemTime> {
    if millis == 0 {
        None
    } else {
        Some(UNIX_EPOCH + Duration::from_millis(millis))
    }
}
