//! Persistence Module
//!
//! Whole-store snapshots to and from a single file.
//!
//! ## Responsibilities
//! - Copy every record out of a live store into a snapshot file
//! - Rebuild a store from a snapshot, re-validating each record
//! - Detect corrupted snapshots (magic, version, length, CRC32)
//!
//! ## File Format
//! ```text
//! ┌───────────┬─────────────┬─────────┬──────────┬──────────────────────┐
//! │ Magic (4) │ Version (1) │ CRC (4) │ Len (8)  │ Body (Len bytes)     │
//! └───────────┴─────────────┴─────────┴──────────┴──────────────────────┘
//! ```
//! Body is bincode of `Vec<SnapshotEntry>`; CRC covers the body only.
//!
//! ## Consistency
//! A save walks the table shard by shard without a global lock. Records
//! written or deleted during the walk may or may not be included, but every
//! included record is whole.

mod reader;
mod snapshot;
mod writer;

pub use reader::load;
pub use snapshot::{decode_snapshot, encode_snapshot, SnapshotEntry, FORMAT_VERSION, HEADER_SIZE, MAGIC};
pub use writer::save;
