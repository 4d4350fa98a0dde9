//! # NabiaKV
//!
//! An embeddable in-memory key-value store with:
//! - Content-typed records (payload + media type)
//! - A versioned binary record codec
//! - Whole-store snapshots to a single file
//! - Sharded, per-key concurrency with lock-free usage counters
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Command Handler                            │
//! │        (read/create/replace/delete/probe/capabilities)       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Record    │          │    Store    │
//!   │   Codec     │          │  (DashMap)  │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │ Persistence │
//!                           │ (Snapshot)  │
//!                           └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod stats;
pub mod store;
pub mod persistence;
pub mod protocol;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{NabiaError, Result};
pub use config::Config;
pub use record::Record;
pub use stats::StatsSnapshot;
pub use store::Store;
pub use client::Client;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of NabiaKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
