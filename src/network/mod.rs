//! Network Module
//!
//! TCP front-end over a [`Store`](crate::store::Store).
//!
//! ## Architecture
//! - Single non-blocking acceptor loop
//! - Worker thread pool fed through a bounded channel
//! - Commands mapped onto store operations by the handler

mod connection;
mod handler;
mod server;

pub use connection::Connection;
pub use handler::execute;
pub use server::{Server, ShutdownHandle};
