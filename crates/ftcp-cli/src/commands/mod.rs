//! CLI command definitions and handlers.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod receive;
pub mod send;

/// Load configuration with graceful fallback to defaults.
///
/// If the config file doesn't exist or can't be parsed, commands fall back
/// to the built-in defaults rather than refusing to run.
pub fn load_config() -> ftcp_core::config::Config {
    ftcp_core::config::Config::load().unwrap_or_default()
}

/// FTCP - chunked point-to-point file transfer over TCP
#[derive(Parser)]
#[command(name = "ftcp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also log to a file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Command {
    /// Send a file to a listening receiver
    Send(SendArgs),

    /// Receive one file and exit
    Receive(ReceiveArgs),
}

/// Arguments for the send command
#[derive(Parser)]
pub struct SendArgs {
    /// File to transfer
    pub file: PathBuf,

    /// Receiver hostname or IP address
    #[arg(short = 'H', long)]
    pub host: String,

    /// Receiver port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Chunk size in bytes
    #[arg(long, value_name = "BYTES")]
    pub chunk_size: Option<u32>,
}

/// Arguments for the receive command
#[derive(Parser)]
pub struct ReceiveArgs {
    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Output directory for the received file
    #[arg(short = 'd', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}
