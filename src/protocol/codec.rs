//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - READ, DELETE, PROBE, CAPABILITIES: key_len (4 bytes) + key
//! - CREATE, REPLACE: key_len (4 bytes) + key + record (record codec)
//! - PING: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! Lengths are big-endian. Keys must be UTF-8.

use std::io::{Read, Write};

use crate::error::{NabiaError, Result};

use super::{Command, CommandType, Response, Status};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Vec<u8> {
    let cmd_type = command.command_type() as u8;

    let payload = match command {
        Command::Read { key }
        | Command::Delete { key }
        | Command::Probe { key }
        | Command::Capabilities { key } => encode_key(key, &[]),
        Command::Create { key, record } | Command::Replace { key, record } => {
            encode_key(key, record)
        }
        Command::Ping => Vec::new(),
    };

    frame(cmd_type, &payload)
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (cmd_type, payload) = unframe(bytes, "command")?;

    let cmd_type = CommandType::from_u8(cmd_type).ok_or_else(|| {
        NabiaError::Protocol(format!("Unknown command type: 0x{:02x}", cmd_type))
    })?;

    match cmd_type {
        CommandType::Read => {
            let key = decode_key_only(payload, cmd_type)?;
            Ok(Command::Read { key })
        }
        CommandType::Create => {
            let (key, record) = decode_key(payload, cmd_type)?;
            Ok(Command::Create {
                key,
                record: record.to_vec(),
            })
        }
        CommandType::Replace => {
            let (key, record) = decode_key(payload, cmd_type)?;
            Ok(Command::Replace {
                key,
                record: record.to_vec(),
            })
        }
        CommandType::Delete => {
            let key = decode_key_only(payload, cmd_type)?;
            Ok(Command::Delete { key })
        }
        CommandType::Probe => {
            let key = decode_key_only(payload, cmd_type)?;
            Ok(Command::Probe { key })
        }
        CommandType::Capabilities => {
            let key = decode_key_only(payload, cmd_type)?;
            Ok(Command::Capabilities { key })
        }
        CommandType::Ping => {
            if !payload.is_empty() {
                return Err(NabiaError::Protocol(format!(
                    "PING command: unexpected payload of {} bytes",
                    payload.len()
                )));
            }
            Ok(Command::Ping)
        }
    }
}

/// key_len (4) + key + trailing bytes
fn encode_key(key: &str, trailing: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(4 + key.len() + trailing.len());
    payload.extend_from_slice(&(key.len() as u32).to_be_bytes());
    payload.extend_from_slice(key.as_bytes());
    payload.extend_from_slice(trailing);
    payload
}

/// Split a payload into its key and the bytes that follow it
fn decode_key(payload: &[u8], cmd_type: CommandType) -> Result<(String, &[u8])> {
    let verb = cmd_type.verb();

    if payload.len() < 4 {
        return Err(NabiaError::Protocol(format!(
            "{} command: missing key length",
            verb
        )));
    }

    let key_len = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]) as usize;

    if payload.len() - 4 < key_len {
        return Err(NabiaError::Protocol(format!(
            "{} command: incomplete key (expected {}, got {})",
            verb,
            key_len,
            payload.len() - 4
        )));
    }

    let key = std::str::from_utf8(&payload[4..4 + key_len])
        .map_err(|e| NabiaError::Protocol(format!("{} command: key is not UTF-8: {}", verb, e)))?
        .to_string();

    Ok((key, &payload[4 + key_len..]))
}

/// Like `decode_key`, but nothing may follow the key
fn decode_key_only(payload: &[u8], cmd_type: CommandType) -> Result<String> {
    let (key, rest) = decode_key(payload, cmd_type)?;
    if !rest.is_empty() {
        return Err(NabiaError::Protocol(format!(
            "{} command: {} unexpected bytes after key",
            cmd_type.verb(),
            rest.len()
        )));
    }
    Ok(key)
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Vec<u8> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    frame(response.status as u8, payload)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = unframe(bytes, "response")?;

    let status = Status::from_u8(status_byte).ok_or_else(|| {
        NabiaError::Protocol(format!("Unknown response status: 0x{:02x}", status_byte))
    })?;

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Framing
// =============================================================================

fn frame(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.push(tag);
    message.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    message.extend_from_slice(payload);
    message
}

/// Validate the header and return (tag, payload)
fn unframe<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(NabiaError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let payload_len = payload_len(&bytes[..HEADER_SIZE], what)?;

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(NabiaError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((bytes[0], &bytes[HEADER_SIZE..total_len]))
}

/// Parse and bound-check the length field of a header
fn payload_len(header: &[u8], what: &str) -> Result<usize> {
    let len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]);
    if len > MAX_PAYLOAD_SIZE {
        return Err(NabiaError::Protocol(format!(
            "{} payload too large: {} bytes (max {})",
            what, len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(len as usize)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one framed message (header + payload) from a stream
fn read_frame<R: Read>(reader: &mut R, what: &str) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = payload_len(&header, what)?;

    let mut message = vec![0u8; HEADER_SIZE + payload_len];
    message[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }

    Ok(message)
}

/// Read a complete command from a stream
///
/// Blocks until a complete command is received or an error occurs
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let message = read_frame(reader, "command")?;
    decode_command(&message)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let message = read_frame(reader, "response")?;
    decode_response(&message)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
