//! Send command implementation.

use anyhow::{Context, Result};

use ftcp_core::file::format_size;
use ftcp_core::transfer::{SendSession, TransferConfig};

use super::SendArgs;
use crate::ui;

/// Run the send command.
pub async fn run(args: SendArgs) -> Result<()> {
    let config_file = super::load_config();

    let config = TransferConfig {
        chunk_size: args.chunk_size.unwrap_or(config_file.transfer.chunk_size),
        max_retries: config_file.transfer.max_retries,
        timeout_secs: config_file.network.timeout_secs,
        connect_attempts: config_file.network.connect_attempts,
    };
    let port = args.port.unwrap_or(config_file.network.port);

    anyhow::ensure!(args.file.exists(), "file not found: {}", args.file.display());

    println!();
    println!("FTCP v{}", ftcp_core::VERSION);
    println!("  Sending {} to {}:{}", args.file.display(), args.host, port);
    println!();

    let mut session = SendSession::new(args.host.clone(), port, args.file.clone(), config);
    let progress = session.progress();
    let renderer = tokio::spawn(ui::render_progress(progress));

    let summary = session
        .run()
        .await
        .with_context(|| format!("transfer of {} failed", args.file.display()))?;

    renderer.await.ok();

    println!();
    println!(
        "  Sent {} in {} chunks ({:.2} s, {:.2} MB/s)",
        format_size(summary.bytes),
        summary.chunks,
        summary.elapsed.as_secs_f64(),
        summary.throughput_mbps(),
    );
    Ok(())
}
