//! Command Handler
//!
//! Maps protocol verbs onto store operations and store results onto
//! response statuses.
//!
//! | verb         | store calls        | statuses                        |
//! |--------------|--------------------|---------------------------------|
//! | READ         | read               | OK, NOT_FOUND, BAD_REQUEST      |
//! | CREATE       | exists, write      | CREATED, CONFLICT, BAD_REQUEST  |
//! | REPLACE      | exists, write      | OK, CREATED, BAD_REQUEST        |
//! | DELETE       | exists, delete     | OK, NOT_FOUND                   |
//! | PROBE        | exists             | OK, NOT_FOUND                   |
//! | CAPABILITIES | exists             | OK                              |
//!
//! CREATE and REPLACE check existence and write in two steps; concurrent
//! writers to the same key can both see it as absent.

use crate::error::{NabiaError, Result};
use crate::protocol::{Command, CommandType, Response};
use crate::record::Record;
use crate::store::Store;

/// Verbs allowed on a key that exists
const EXISTING_KEY_VERBS: [CommandType; 4] = [
    CommandType::Read,
    CommandType::Replace,
    CommandType::Delete,
    CommandType::Probe,
];

/// Verbs allowed on a key that does not exist
const ABSENT_KEY_VERBS: [CommandType; 3] = [
    CommandType::Create,
    CommandType::Replace,
    CommandType::Probe,
];

/// Execute a command against the store
pub fn execute(store: &Store, command: Command) -> Response {
    match command {
        Command::Read { key } => match store.read(&key) {
            Ok(record) => match record.encode() {
                Ok(bytes) => Response::ok(Some(bytes)),
                Err(e) => error_response(e),
            },
            Err(NabiaError::NotFound(_)) => Response::not_found(),
            Err(e) => error_response(e),
        },

        Command::Create { key, record } => {
            if store.exists(&key) {
                return Response::conflict();
            }
            match write_encoded(store, &key, &record) {
                Ok(()) => Response::created(),
                Err(e) => error_response(e),
            }
        }

        Command::Replace { key, record } => {
            let existed = store.exists(&key);
            match write_encoded(store, &key, &record) {
                Ok(()) if existed => Response::ok(None),
                Ok(()) => Response::created(),
                Err(e) => error_response(e),
            }
        }

        Command::Delete { key } => {
            if store.exists(&key) {
                store.delete(&key);
                Response::ok(None)
            } else {
                Response::not_found()
            }
        }

        Command::Probe { key } => {
            if store.exists(&key) {
                Response::ok(None)
            } else {
                Response::not_found()
            }
        }

        Command::Capabilities { key } => {
            let verbs: &[CommandType] = if store.exists(&key) {
                &EXISTING_KEY_VERBS
            } else {
                &ABSENT_KEY_VERBS
            };
            let allowed = verbs
                .iter()
                .map(|verb| verb.verb())
                .collect::<Vec<_>>()
                .join(", ");
            Response::ok(Some(allowed.into_bytes()))
        }

        Command::Ping => Response::ok(Some(b"PONG".to_vec())),
    }
}

/// Decode a codec-packed record and write it
///
/// The front-end refuses empty bodies even though the store accepts them.
fn write_encoded(store: &Store, key: &str, encoded: &[u8]) -> Result<()> {
    let record = Record::decode(encoded)?;
    if record.payload().is_empty() {
        return Err(NabiaError::InvalidValue);
    }
    store.write(key, Some(record.payload()), record.content_type())
}

fn error_response(error: NabiaError) -> Response {
    if error.is_validation() {
        Response::bad_request(&error.to_string())
    } else {
        tracing::warn!("Command failed: {}", error);
        Response::error(&error.to_string())
    }
}
