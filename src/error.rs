//! Error types for NabiaKV
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using NabiaError
pub type Result<T> = std::result::Result<T, NabiaError>;

/// Unified error type for NabiaKV operations
#[derive(Debug, Error)]
pub enum NabiaError {
    // -------------------------------------------------------------------------
    // Validation Errors
    // -------------------------------------------------------------------------
    #[error("Invalid key: key cannot be empty")]
    InvalidKey,

    #[error("Invalid value: value cannot be absent")]
    InvalidValue,

    #[error("Invalid content-type: {0}")]
    InvalidContentType(String),

    #[error("Content-type is too large: {0} bytes (max 255)")]
    ContentTypeTooLarge(usize),

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Key {0:?} doesn't exist")]
    NotFound(String),

    // -------------------------------------------------------------------------
    // Record Codec Errors
    // -------------------------------------------------------------------------
    #[error("Truncated record: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Unsupported record version: {0}")]
    UnsupportedVersion(u8),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Signal handler error: {0}")]
    Signal(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl NabiaError {
    /// Whether the error was caused by the caller's input rather than by the
    /// store or the environment
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            NabiaError::InvalidKey
                | NabiaError::InvalidValue
                | NabiaError::InvalidContentType(_)
                | NabiaError::ContentTypeTooLarge(_)
                | NabiaError::Truncated { .. }
                | NabiaError::UnsupportedVersion(_)
        )
    }
}
