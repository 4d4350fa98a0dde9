//! Record Module
//!
//! The value stored under a key: a payload plus its declared media type.
//!
//! ## Responsibilities
//! - Own the payload bytes and content-type of a single value
//! - Validate content-types (`type/subtype[;attribute=value...]`)
//! - Pack/unpack a record to the versioned binary framing (see [`codec`])

pub mod codec;
pub mod content_type;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use codec::{decode, encode, CURRENT_VERSION, HEADER_SIZE, MAX_CONTENT_TYPE_LEN};
pub use content_type::MediaType;

/// A payload paired with the media type describing it.
///
/// Records are immutable once stored; a write replaces the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    payload: Vec<u8>,
    content_type: String,
}

impl Record {
    /// Create a record without validating the content-type
    pub fn new(payload: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            content_type: content_type.into(),
        }
    }

    /// Raw value bytes (may be empty)
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The payload as a string, if it is valid UTF-8
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }

    /// Approximate heap footprint in bytes
    pub fn size(&self) -> usize {
        self.payload.len() + self.content_type.len()
    }

    /// Split the record into its payload and content-type
    pub fn into_parts(self) -> (Vec<u8>, String) {
        (self.payload, self.content_type)
    }

    /// Encode with the record framing
    pub fn encode(&self) -> Result<Vec<u8>> {
        codec::encode(&self.payload, &self.content_type)
    }

    /// Decode from the record framing
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let (payload, content_type) = codec::decode(bytes)?;
        Ok(Self {
            payload,
            content_type,
        })
    }
}
