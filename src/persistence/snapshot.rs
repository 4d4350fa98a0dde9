//! Snapshot encoding
//!
//! Header + checksummed bincode body. File I/O lives in the reader/writer.

use serde::{Deserialize, Serialize};

use crate::error::{NabiaError, Result};
use crate::record::Record;

/// Magic bytes identifying a NabiaKV snapshot file
pub const MAGIC: &[u8; 4] = b"NBSN";

/// Current snapshot format version
pub const FORMAT_VERSION: u8 = 1;

/// Header size: Magic (4) + Version (1) + CRC (4) + Len (8) = 17 bytes
pub const HEADER_SIZE: usize = 17;

/// One key and its record as stored in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub key: String,
    pub record: Record,
}

/// Serialize entries into a complete snapshot (header + body)
pub fn encode_snapshot(entries: &[SnapshotEntry]) -> Result<Vec<u8>> {
    let body = bincode::serialize(entries)
        .map_err(|e| NabiaError::Serialization(format!("Failed to encode snapshot: {}", e)))?;

    let crc = crc32fast::hash(&body);

    let mut bytes = Vec::with_capacity(HEADER_SIZE + body.len());
    bytes.extend_from_slice(MAGIC);
    bytes.push(FORMAT_VERSION);
    bytes.extend_from_slice(&crc.to_le_bytes());
    bytes.extend_from_slice(&(body.len() as u64).to_le_bytes());
    bytes.extend_from_slice(&body);

    Ok(bytes)
}

/// Parse and verify a snapshot produced by [`encode_snapshot`]
///
/// Any mismatch fails with `Protocol`; nothing is partially decoded.
pub fn decode_snapshot(bytes: &[u8]) -> Result<Vec<SnapshotEntry>> {
    if bytes.len() < HEADER_SIZE {
        return Err(NabiaError::Protocol(format!(
            "Snapshot too short: expected at least {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    if &bytes[0..4] != MAGIC {
        return Err(NabiaError::Protocol(
            "Not a snapshot file (bad magic)".to_string(),
        ));
    }

    let version = bytes[4];
    if version != FORMAT_VERSION {
        return Err(NabiaError::Protocol(format!(
            "Unsupported snapshot format version: {}",
            version
        )));
    }

    let stored_crc = u32::from_le_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]);
    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&bytes[9..HEADER_SIZE]);
    let body_len = u64::from_le_bytes(len_bytes);

    let body = &bytes[HEADER_SIZE..];
    if body.len() as u64 != body_len {
        return Err(NabiaError::Protocol(format!(
            "Snapshot body length mismatch: header says {}, file has {}",
            body_len,
            body.len()
        )));
    }

    let computed_crc = crc32fast::hash(body);
    if computed_crc != stored_crc {
        return Err(NabiaError::Protocol(format!(
            "Snapshot CRC mismatch: expected {:#010x}, got {:#010x}",
            stored_crc, computed_crc
        )));
    }

    bincode::deserialize(body)
        .map_err(|e| NabiaError::Protocol(format!("Failed to decode snapshot body: {}", e)))
}
