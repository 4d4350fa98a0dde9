//! Command definitions
//!
//! Represents requests from clients. Each verb maps onto one or two store
//! operations; values travel as record-codec blobs.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Read = 0x01,
    Create = 0x02,
    Replace = 0x03,
    Delete = 0x04,
    Probe = 0x05,
    Capabilities = 0x06,
    Ping = 0x07,
}

impl CommandType {
    /// Parse a command type byte
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(CommandType::Read),
            0x02 => Some(CommandType::Create),
            0x03 => Some(CommandType::Replace),
            0x04 => Some(CommandType::Delete),
            0x05 => Some(CommandType::Probe),
            0x06 => Some(CommandType::Capabilities),
            0x07 => Some(CommandType::Ping),
            _ => None,
        }
    }

    /// Verb name as reported by the capabilities command
    pub fn verb(&self) -> &'static str {
        match self {
            CommandType::Read => "READ",
            CommandType::Create => "CREATE",
            CommandType::Replace => "REPLACE",
            CommandType::Delete => "DELETE",
            CommandType::Probe => "PROBE",
            CommandType::Capabilities => "CAPABILITIES",
            CommandType::Ping => "PING",
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch the record under a key
    Read { key: String },

    /// Store a record only if the key is absent
    Create { key: String, record: Vec<u8> },

    /// Store a record, replacing any previous one
    Replace { key: String, record: Vec<u8> },

    /// Remove a key
    Delete { key: String },

    /// Check whether a key exists
    Probe { key: String },

    /// List the verbs currently allowed on a key
    Capabilities { key: String },

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Read { .. } => CommandType::Read,
            Command::Create { .. } => CommandType::Create,
            Command::Replace { .. } => CommandType::Replace,
            Command::Delete { .. } => CommandType::Delete,
            Command::Probe { .. } => CommandType::Probe,
            Command::Capabilities { .. } => CommandType::Capabilities,
            Command::Ping => CommandType::Ping,
        }
    }

    /// The key the command targets, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            Command::Read { key }
            | Command::Create { key, .. }
            | Command::Replace { key, .. }
            | Command::Delete { key }
            | Command::Probe { key }
            | Command::Capabilities { key } => Some(key),
            Command::Ping => None,
        }
    }
}
