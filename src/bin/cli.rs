//! NabiaKV CLI Client
//!
//! Command-line interface for interacting with NabiaKV.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Args as ClapArgs, Parser, Subcommand};
use nabiakv::{Client, Result};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// NabiaKV CLI
#[derive(Parser, Debug)]
#[command(name = "nabiakv-cli")]
#[command(about = "CLI for the NabiaKV key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:5380")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Create a key; fails if it already exists
    Create(ValueArgs),

    /// Set a key, replacing any existing value
    Put(ValueArgs),

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Check whether a key exists
    Head {
        /// The key to check
        key: String,
    },

    /// List the verbs allowed on a key
    Options {
        /// The key to inspect
        key: String,
    },

    /// Ping the server
    Ping,
}

#[derive(ClapArgs, Debug)]
struct ValueArgs {
    /// The key to write
    key: String,

    /// The value to write
    value: Option<String>,

    /// Read the value from a file instead
    #[arg(short, long, conflicts_with = "value")]
    file: Option<PathBuf>,

    /// Content-type of the value
    #[arg(short, long, default_value = DEFAULT_CONTENT_TYPE)]
    content_type: String,
}

impl ValueArgs {
    fn payload(&self) -> Result<Vec<u8>> {
        match (&self.value, &self.file) {
            (Some(value), _) => Ok(value.clone().into_bytes()),
            (None, Some(path)) => Ok(fs::read(path)?),
            (None, None) => Err(nabiakv::NabiaError::InvalidValue),
        }
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut client = Client::connect(&args.server)?;

    match args.command {
        Commands::Get { key } => match client.read(&key)? {
            Some(record) => {
                match record.as_text() {
                    Some(text) => println!("{}", text),
                    None => println!(
                        "{} bytes of {}; not valid UTF-8, refusing to print to stdout",
                        record.payload().len(),
                        record.content_type()
                    ),
                }
            }
            None => {
                println!("(not found)");
                process::exit(1);
            }
        },
        Commands::Create(value_args) => {
            let payload = value_args.payload()?;
            if client.create(&value_args.key, &payload, &value_args.content_type)? {
                println!("Created {}", value_args.key);
            } else {
                println!("{} already exists", value_args.key);
                process::exit(1);
            }
        }
        Commands::Put(value_args) => {
            let payload = value_args.payload()?;
            if client.replace(&value_args.key, &payload, &value_args.content_type)? {
                println!("Created {}", value_args.key);
            } else {
                println!("Replaced {}", value_args.key);
            }
        }
        Commands::Del { key } => {
            if client.delete(&key)? {
                println!("Deleted {}", key);
            } else {
                println!("(not found)");
                process::exit(1);
            }
        }
        Commands::Head { key } => {
            if client.probe(&key)? {
                println!("{} exists", key);
            } else {
                println!("(not found)");
                process::exit(1);
            }
        }
        Commands::Options { key } => {
            println!("{}", client.capabilities(&key)?.join(", "));
        }
        Commands::Ping => {
            client.ping()?;
            println!("PONG");
        }
    }

    Ok(())
}
