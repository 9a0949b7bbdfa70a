//! Progress rendering for the terminal.

use std::io::Write;

use tokio::sync::watch;

use ftcp_core::transfer::{TransferProgress, TransferState};

/// Render transfer progress to stderr until the session reaches a terminal
/// state.
///
/// The cadence here is purely cosmetic; the protocol never depends on it.
pub async fn render_progress(mut rx: watch::Receiver<TransferProgress>) {
    let mut last_chunks = 0;

    while rx.changed().await.is_ok() {
        let progress = rx.borrow().clone();

        match progress.state {
            TransferState::Waiting => {
                eprintln!("  Waiting for a connection...");
            }
            TransferState::Transferring if progress.chunks_done != last_chunks => {
                last_chunks = progress.chunks_done;
                eprint!(
                    "\r  {:5.1}% ({}/{} chunks) {:.2} MB/s   ",
                    progress.percentage(),
                    progress.chunks_done,
                    progress.total_chunks,
                    progress.speed_bps as f64 / 1_000_000.0,
                );
                let _ = std::io::stderr().flush();
            }
            TransferState::Completed => {
                eprintln!("\r  100.0% ({}/{} chunks)            ", progress.total_chunks, progress.total_chunks);
                break;
            }
            TransferState::Failed => {
                eprintln!();
                break;
            }
            _ => {}
        }
    }
}
