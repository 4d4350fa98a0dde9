//! Response definitions
//!
//! Represents responses to clients.

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    Created = 0x01,
    NotFound = 0x02,
    Conflict = 0x03,
    BadRequest = 0x04,
    Error = 0x05,
}

impl Status {
    /// Parse a status byte
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Status::Ok),
            0x01 => Some(Status::Created),
            0x02 => Some(Status::NotFound),
            0x03 => Some(Status::Conflict),
            0x04 => Some(Status::BadRequest),
            0x05 => Some(Status::Error),
            _ => None,
        }
    }

    /// Ok or Created
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Ok | Status::Created)
    }
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (record for READ, verbs for CAPABILITIES, message for errors)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    pub fn created() -> Self {
        Self {
            status: Status::Created,
            payload: None,
        }
    }

    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            payload: None,
        }
    }

    pub fn conflict() -> Self {
        Self {
            status: Status::Conflict,
            payload: None,
        }
    }

    /// Create a BAD_REQUEST response carrying the reason
    pub fn bad_request(message: &str) -> Self {
        Self {
            status: Status::BadRequest,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Payload interpreted as UTF-8 text (error messages, verb lists)
    pub fn message(&self) -> Option<String> {
        self.payload
            .as_ref()
            .map(|p| String::from_utf8_lossy(p).into_owned())
    }
}
