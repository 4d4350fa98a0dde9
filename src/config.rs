//! Configuration for NabiaKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{NabiaError, Result};

/// Main configuration for a NabiaKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Snapshot file the store is loaded from and saved to on stop
    pub db_location: PathBuf,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max connections queued or being served at once
    pub max_connections: usize,

    /// Number of worker threads serving connections
    pub worker_threads: usize,

    /// Connection read timeout (milliseconds); also bounds how long an idle
    /// client can delay shutdown
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_location: PathBuf::from("./nabia.db"),
            listen_addr: "127.0.0.1:5380".to_string(),
            max_connections: 1024,
            worker_threads: 8,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the values that would otherwise fail late, at bind or write time
    pub fn validate(&self) -> Result<()> {
        if self.db_location.as_os_str().is_empty() {
            return Err(NabiaError::Config("db_location cannot be empty".to_string()));
        }
        if self.max_connections == 0 {
            return Err(NabiaError::Config("max_connections must be at least 1".to_string()));
        }
        if self.worker_threads == 0 {
            return Err(NabiaError::Config("worker_threads must be at least 1".to_string()));
        }
        // A blocked worker without a timeout would never see shutdown
        if self.read_timeout_ms == 0 {
            return Err(NabiaError::Config("read_timeout_ms must be at least 1".to_string()));
        }
        if self.write_timeout_ms == 0 {
            return Err(NabiaError::Config("write_timeout_ms must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the snapshot location
    pub fn db_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.db_location = path.into();
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the number of worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
