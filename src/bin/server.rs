//! NabiaKV Server Binary
//!
//! Loads (or creates) the snapshot, serves the TCP protocol, and saves the
//! store again on shutdown. Ctrl+C, SIGTERM or `quit` on stdin stops the
//! server.

use std::io::BufRead;
use std::sync::Arc;

use clap::Parser;
use nabiakv::network::{Server, ShutdownHandle};
use nabiakv::{Config, Store};
use tracing_subscriber::{fmt, EnvFilter};

/// NabiaKV Server
#[derive(Parser, Debug)]
#[command(name = "nabiakv-server")]
#[command(about = "In-memory key-value store with content-typed records")]
#[command(version)]
struct Args {
    /// Snapshot file to load from and save to
    #[arg(short, long, default_value = "./nabia.db")]
    db_location: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:5380")]
    listen: String,

    /// Maximum queued connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Worker threads serving connections
    #[arg(short, long, default_value = "8")]
    workers: usize,

    /// Idle read timeout per connection, in milliseconds (at least 1)
    #[arg(long, default_value = "5000")]
    read_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,nabiakv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("NabiaKV Server v{}", nabiakv::VERSION);
    tracing::info!("Snapshot location: {}", args.db_location);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .db_location(&args.db_location)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .worker_threads(args.workers)
        .read_timeout_ms(args.read_timeout_ms)
        .build();

    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let store = match Store::open(&config.db_location) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Store ready with {} records", store.len());

    let server = match Server::bind(config, Arc::clone(&store)) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    let shutdown = server.shutdown_handle();
    if let Err(e) = shutdown.shutdown_on_signals() {
        tracing::warn!("{}; use `quit` on stdin to stop", e);
    }
    watch_stdin(shutdown);

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
    }

    tracing::info!("Shutdown requested. Saving data...");
    if let Err(e) = store.stop() {
        tracing::error!("Final save failed: {}", e);
        std::process::exit(1);
    }
    tracing::info!("Data saved. Quitting...");
}

/// Stop the server when `quit`, `exit` or `stop` is read from stdin
fn watch_stdin(handle: ShutdownHandle) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) if matches!(line.trim(), "quit" | "exit" | "stop") => {
                    tracing::info!("Received {:?} on stdin", line.trim());
                    handle.shutdown();
                    return;
                }
                Ok(_) => {}
                Err(_) => return,
            }
        }
    });
}
