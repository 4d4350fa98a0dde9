//! Protocol Module
//!
//! Defines the wire protocol between the network front-end and clients.
//!
//! ## Protocol Format (V1 - Simple Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: READ         - Payload: key_len (4) + key
//! - 0x02: CREATE       - Payload: key_len (4) + key + record
//! - 0x03: REPLACE      - Payload: key_len (4) + key + record
//! - 0x04: DELETE       - Payload: key_len (4) + key
//! - 0x05: PROBE        - Payload: key_len (4) + key
//! - 0x06: CAPABILITIES - Payload: key_len (4) + key
//! - 0x07: PING         - Payload: empty
//!
//! `record` is a value packed with the record codec
//! (see [`crate::record::codec`]).
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK
//! - 0x01: CREATED
//! - 0x02: NOT_FOUND
//! - 0x03: CONFLICT
//! - 0x04: BAD_REQUEST
//! - 0x05: ERROR

mod codec;
mod command;
mod response;

pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
pub use command::{Command, CommandType};
pub use response::{Response, Status};
