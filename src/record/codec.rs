//! Record codec
//!
//! Packs a payload and its content-type into one opaque byte sequence.
//!
//! ## Wire Format (version 0)
//! ```text
//! ┌─────────────┬─────────────┬──────────────────┬──────────────────────┐
//! │ Version (1) │ CT Len (1)  │ Content-Type (n) │ Payload (remainder)  │
//! └─────────────┴─────────────┴──────────────────┴──────────────────────┘
//! ```
//!
//! - `Version` is always `0`; any other value is rejected on decode
//! - `CT Len` is `1..=255`; a zero length never decodes
//! - The payload length is implied by the buffer length

use bytes::{Buf, BufMut};

use crate::error::{NabiaError, Result};

use super::content_type;

/// The only framing version currently defined
pub const CURRENT_VERSION: u8 = 0;

/// Header size: version (1) + content-type length (1)
pub const HEADER_SIZE: usize = 2;

/// Longest content-type the length byte can describe
pub const MAX_CONTENT_TYPE_LEN: usize = u8::MAX as usize;

/// Encode a payload and content-type
///
/// Fails with `ContentTypeTooLarge` when the content-type does not fit in
/// the length byte. The content-type is otherwise written as given.
pub fn encode(payload: &[u8], content_type: &str) -> Result<Vec<u8>> {
    let ct_len = content_type.len();
    if ct_len > MAX_CONTENT_TYPE_LEN {
        return Err(NabiaError::ContentTypeTooLarge(ct_len));
    }

    let mut buf = Vec::with_capacity(HEADER_SIZE + ct_len + payload.len());
    buf.put_u8(CURRENT_VERSION);
    buf.put_u8(ct_len as u8);
    buf.put_slice(content_type.as_bytes());
    buf.put_slice(payload);

    Ok(buf)
}

/// Decode bytes produced by [`encode`] into `(payload, content_type)`
pub fn decode(bytes: &[u8]) -> Result<(Vec<u8>, String)> {
    if bytes.len() < HEADER_SIZE {
        return Err(NabiaError::Truncated {
            expected: HEADER_SIZE,
            actual: bytes.len(),
        });
    }

    let mut buf = bytes;

    let version = buf.get_u8();
    if version != CURRENT_VERSION {
        return Err(NabiaError::UnsupportedVersion(version));
    }

    let ct_len = buf.get_u8() as usize;
    if ct_len == 0 {
        return Err(NabiaError::InvalidContentType(
            "content-type cannot be empty (read length 0)".to_string(),
        ));
    }

    if buf.remaining() < ct_len {
        return Err(NabiaError::Truncated {
            expected: HEADER_SIZE + ct_len,
            actual: bytes.len(),
        });
    }

    let content_type = std::str::from_utf8(&buf[..ct_len])
        .map_err(|e| NabiaError::InvalidContentType(format!("content-type is not UTF-8: {}", e)))?
        .to_string();
    content_type::validate(&content_type)?;
    buf.advance(ct_len);

    Ok((buf.to_vec(), content_type))
}
