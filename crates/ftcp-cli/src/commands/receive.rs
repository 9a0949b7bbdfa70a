//! Receive command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};

use ftcp_core::file::format_size;
use ftcp_core::transfer::{ReceiveSession, TransferConfig};

use super::ReceiveArgs;
use crate::ui;

/// Run the receive command.
///
/// Listens for one transfer, writes the file, and exits.
pub async fn run(args: ReceiveArgs) -> Result<()> {
    let config_file = super::load_config();

    let config = TransferConfig {
        chunk_size: config_file.transfer.chunk_size,
        max_retries: config_file.transfer.max_retries,
        timeout_secs: config_file.network.timeout_secs,
        connect_attempts: config_file.network.connect_attempts,
    };
    let port = args.port.unwrap_or(config_file.network.port);
    let output_dir = args
        .output_dir
        .or_else(|| config_file.receive.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    println!();
    println!("FTCP v{}", ftcp_core::VERSION);
    println!(
        "  Listening on port {port}, writing to {}",
        output_dir.display()
    );
    println!();

    let mut session = ReceiveSession::bind(port, output_dir, config)
        .await
        .context("failed to start receiver")?;
    let progress = session.progress();
    let renderer = tokio::spawn(ui::render_progress(progress));

    let (path, summary) = session.run().await.context("transfer failed")?;

    renderer.await.ok();

    println!();
    println!(
        "  Received {} -> {} ({:.2} s, {:.2} MB/s)",
        format_size(summary.bytes),
        path.display(),
        summary.elapsed.as_secs_f64(),
        summary.throughput_mbps(),
    );
    Ok(())
}
