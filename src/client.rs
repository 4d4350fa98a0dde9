//! Client Module
//!
//! Blocking TCP client for the NabiaKV protocol.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{NabiaError, Result};
use crate::protocol::{read_response, write_command, Command, Response, Status};
use crate::record::{self, Record};

/// A connection to a NabiaKV server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| NabiaError::Network(format!("Failed to connect: {}", e)))?;
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Bound how long a single response may take
    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.reader.get_ref().set_read_timeout(timeout)?;
        self.writer.get_ref().set_write_timeout(timeout)?;
        Ok(())
    }

    /// Fetch the record under `key`; `None` if absent
    pub fn read(&mut self, key: &str) -> Result<Option<Record>> {
        let response = self.call(&Command::Read {
            key: key.to_string(),
        })?;
        match response.status {
            Status::Ok => {
                let bytes = response.payload.unwrap_or_default();
                Ok(Some(Record::decode(&bytes)?))
            }
            Status::NotFound => Ok(None),
            _ => Err(unexpected(&response)),
        }
    }

    /// Store a value only if the key is absent
    ///
    /// Returns `false` when the key already exists.
    pub fn create(&mut self, key: &str, payload: &[u8], content_type: &str) -> Result<bool> {
        let response = self.call(&Command::Create {
            key: key.to_string(),
            record: record::encode(payload, content_type)?,
        })?;
        match response.status {
            Status::Created => Ok(true),
            Status::Conflict => Ok(false),
            _ => Err(unexpected(&response)),
        }
    }

    /// Store a value, replacing any previous one
    ///
    /// Returns `true` when the key was newly created.
    pub fn replace(&mut self, key: &str, payload: &[u8], content_type: &str) -> Result<bool> {
        let response = self.call(&Command::Replace {
            key: key.to_string(),
            record: record::encode(payload, content_type)?,
        })?;
        match response.status {
            Status::Created => Ok(true),
            Status::Ok => Ok(false),
            _ => Err(unexpected(&response)),
        }
    }

    /// Remove a key; returns whether it existed
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        let response = self.call(&Command::Delete {
            key: key.to_string(),
        })?;
        presence(&response)
    }

    /// Check whether a key exists
    pub fn probe(&mut self, key: &str) -> Result<bool> {
        let response = self.call(&Command::Probe {
            key: key.to_string(),
        })?;
        presence(&response)
    }

    /// Verbs the server currently allows on `key`
    pub fn capabilities(&mut self, key: &str) -> Result<Vec<String>> {
        let response = self.call(&Command::Capabilities {
            key: key.to_string(),
        })?;
        if response.status != Status::Ok {
            return Err(unexpected(&response));
        }
        Ok(response
            .message()
            .unwrap_or_default()
            .split(',')
            .map(|verb| verb.trim().to_string())
            .filter(|verb| !verb.is_empty())
            .collect())
    }

    pub fn ping(&mut self) -> Result<()> {
        let response = self.call(&Command::Ping)?;
        match (response.status, response.payload.as_deref()) {
            (Status::Ok, Some(b"PONG")) => Ok(()),
            _ => Err(unexpected(&response)),
        }
    }

    fn call(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        read_response(&mut self.reader)
    }
}

/// OK means present, NOT_FOUND absent
fn presence(response: &Response) -> Result<bool> {
    match response.status {
        Status::Ok => Ok(true),
        Status::NotFound => Ok(false),
        _ => Err(unexpected(response)),
    }
}

fn unexpected(response: &Response) -> NabiaError {
    NabiaError::Protocol(format!(
        "Server responded {:?}: {}",
        response.status,
        response.message().unwrap_or_default()
    ))
}
