//! FTCP CLI - chunked point-to-point file transfer over TCP
//!
//! ## Quick Start
//!
//! ```bash
//! # Receive into ./downloads (runs until one transfer completes)
//! ftcp receive -d ./downloads
//!
//! # Send a file (on another machine)
//! ftcp send ./video.mkv -H 192.168.1.10
//! ```

#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]

use std::path::Path;

use anyhow::Result;
use clap::Parser;

mod commands;
pub mod ui;

use commands::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Command::Send(args) => commands::send::run(args).await,
        Command::Receive(args) => commands::receive::run(args).await,
    }
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default_filter = if verbose {
        "info,ftcp=debug,ftcp_core=debug"
    } else {
        "warn,ftcp=info,ftcp_core=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);

    let registry = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter);

    if let Some(path) = log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        registry
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Arc::new(file)),
            )
            .init();
    } else {
        registry.init();
    }

    Ok(())
}
