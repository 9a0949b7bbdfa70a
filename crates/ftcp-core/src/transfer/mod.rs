//! File transfer engine for FTCP.
//!
//! This module drives both roles of a transfer:
//!
//! - [`SendSession`] connects out, negotiates the handshake, announces the
//!   file, and pushes chunks in strict lock-step with the receiver's acks.
//! - [`ReceiveSession`] accepts one connection, validates the announced
//!   file, assembles chunks into a hidden temp file, and publishes the
//!   result atomically.
//!
//! ## Transfer Protocol
//!
//! - Default chunk size: 512 KB
//! - One chunk in flight at a time; chunk `n` is acked before `n+1` is sent
//! - Checksum: CRC-32 per chunk, verified by the receiver
//! - Failed chunks are retransmitted up to 3 times, then the transfer aborts

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio::net::TcpStream;
use tokio::sync::watch;

use crate::error::{describe_wire_code, Error, Result};
use crate::file::{disk_available, sanitize_filename, SourceFile, TempFileWriter};
use crate::protocol::exchange;
use crate::protocol::{
    ChecksumType, ChunkAck, ErrorMessage, FileAck, FileInfo, HandshakePayload, MessageType,
    ERROR_MESSAGE_SIZE, FILE_CHECKSUM_SIZE, FILE_INFO_SIZE, HANDSHAKE_SIZE,
};
use crate::transport::{self, io_timeout, Listener};
use crate::{
    DEFAULT_CHUNK_SIZE, DEFAULT_CONNECT_ATTEMPTS, DEFAULT_TIMEOUT_SECS, MAX_CHUNK_RETRIES,
    PROTOCOL_VERSION,
};

/// Configuration for a transfer session.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Chunk size in bytes
    pub chunk_size: u32,
    /// Attempts per chunk before the transfer aborts
    pub max_retries: u32,
    /// Socket timeout applied to every network wait, in seconds
    pub timeout_secs: u64,
    /// Connection attempts for the sender
    pub connect_attempts: u32,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_retries: MAX_CHUNK_RETRIES,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
        }
    }
}

/// Transfer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    /// Preparing transfer
    Preparing,
    /// Waiting for a connection
    Waiting,
    /// Connected, negotiating
    Connected,
    /// Moving chunks
    Transferring,
    /// Publishing the received file
    Finalizing,
    /// Transfer completed successfully
    Completed,
    /// Transfer failed
    Failed,
}

/// Progress information for a transfer.
#[derive(Debug, Clone)]
pub struct TransferProgress {
    /// Current state
    pub state: TransferState,
    /// Name of the file being transferred
    pub filename: String,
    /// Chunks fully acknowledged
    pub chunks_done: u64,
    /// Total number of chunks
    pub total_chunks: u64,
    /// Bytes transferred so far
    pub bytes_transferred: u64,
    /// Total bytes in the file
    pub total_bytes: u64,
    /// Transfer speed in bytes per second
    pub speed_bps: u64,
    /// When the session started
    pub started_at: Instant,
}

impl TransferProgress {
    fn new() -> Self {
        Self {
            state: TransferState::Preparing,
            filename: String::new(),
            chunks_done: 0,
            total_chunks: 0,
            bytes_transferred: 0,
            total_bytes: 0,
            speed_bps: 0,
            started_at: Instant::now(),
        }
    }

    /// Get overall progress as a percentage (0.0 - 100.0).
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.total_bytes == 0 {
            100.0
        } else {
            (self.bytes_transferred as f64 / self.total_bytes as f64) * 100.0
        }
    }
}

/// Statistics of a completed transfer.
#[derive(Debug, Clone, Copy)]
pub struct TransferSummary {
    /// Bytes moved
    pub bytes: u64,
    /// Chunks moved
    pub chunks: u64,
    /// Wall-clock duration of the chunk phase
    pub elapsed: Duration,
}

impl TransferSummary {
    /// Average throughput in megabytes per second.
    #[must_use]
    pub fn throughput_mbps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes as f64 / secs / 1_000_000.0
        } else {
            0.0
        }
    }
}

/// Take the current sequence number and advance the counter.
fn next_seq(seq: &mut u64) -> u64 {
    let current = *seq;
    *seq += 1;
    current
}

/// Shared progress plumbing for both roles.
#[derive(Debug)]
struct ProgressChannel {
    tx: watch::Sender<TransferProgress>,
    rx: watch::Receiver<TransferProgress>,
}

impl ProgressChannel {
    fn new() -> Self {
        let (tx, rx) = watch::channel(TransferProgress::new());
        Self { tx, rx }
    }

    fn subscribe(&self) -> watch::Receiver<TransferProgress> {
        self.rx.clone()
    }

    fn set_state(&self, state: TransferState) {
        let mut progress = self.rx.borrow().clone();
        progress.state = state;
        let _ = self.tx.send(progress);
    }

    fn begin(&self, filename: &str, total_chunks: u64, total_bytes: u64) {
        let mut progress = self.rx.borrow().clone();
        progress.state = TransferState::Transferring;
        progress.filename = filename.to_string();
        progress.total_chunks = total_chunks;
        progress.total_bytes = total_bytes;
        progress.started_at = Instant::now();
        let _ = self.tx.send(progress);
    }

    fn record_chunk(&self, bytes: u64) {
        let mut progress = self.rx.borrow().clone();
        progress.chunks_done += 1;
        progress.bytes_transferred += bytes;
        let elapsed = progress.started_at.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                progress.speed_bps = (progress.bytes_transferred as f64 / elapsed) as u64;
            }
        }
        let _ = self.tx.send(progress);
    }
}

/// The sender role: uploads one file to a listening receiver.
#[derive(Debug)]
pub struct SendSession {
    host: String,
    port: u16,
    path: PathBuf,
    config: TransferConfig,
    progress: ProgressChannel,
}

impl SendSession {
    /// Create a send session for one file.
    #[must_use]
    pub fn new(host: String, port: u16, path: PathBuf, config: TransferConfig) -> Self {
        Self {
            host,
            port,
            path,
            config,
            progress: ProgressChannel::new(),
        }
    }

    /// Get a progress receiver.
    #[must_use]
    pub fn progress(&self) -> watch::Receiver<TransferProgress> {
        self.progress.subscribe()
    }

    /// Run the transfer to completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the connection fails,
    /// the peer rejects the transfer, or a chunk exhausts its retries.
    pub async fn run(&mut self) -> Result<TransferSummary> {
        let result = self.run_inner().await;
        if result.is_err() {
            self.progress.set_state(TransferState::Failed);
        }
        result
    }

    async fn run_inner(&mut self) -> Result<TransferSummary> {
        if self.config.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be nonzero".to_string()));
        }

        let mut source = SourceFile::open(&self.path).await?;
        let meta = source.metadata.clone();
        let chunk_size = self.config.chunk_size;
        let total_chunks = meta.size.div_ceil(u64::from(chunk_size));

        tracing::info!(
            file = %meta.filename,
            size = meta.size,
            total_chunks,
            chunk_size,
            "starting transfer"
        );

        let mut stream = transport::connect_with_retry(
            &self.host,
            self.port,
            self.config.connect_attempts,
            self.config.timeout_secs,
        )
        .await?;
        self.progress.set_state(TransferState::Connected);

        self.do_handshake(&mut stream).await?;

        let mut sequence: u64 = 2;
        self.announce_file(&mut stream, &meta, total_chunks, &mut sequence)
            .await?;

        self.progress.begin(&meta.filename, total_chunks, meta.size);
        let started = Instant::now();
        let mut sent_bytes: u64 = 0;

        for chunk_id in 0..total_chunks {
            let offset = chunk_id * u64::from(chunk_size);
            #[allow(clippy::cast_possible_truncation)]
            let len = u64::from(chunk_size).min(meta.size - offset) as usize;

            let data = source.read_chunk_at(offset, len).await?;
            self.send_chunk_with_retry(&mut stream, chunk_id, offset, &data, &mut sequence)
                .await?;

            sent_bytes += data.len() as u64;
            self.progress.record_chunk(data.len() as u64);
        }

        let summary = TransferSummary {
            bytes: sent_bytes,
            chunks: total_chunks,
            elapsed: started.elapsed(),
        };
        self.progress.set_state(TransferState::Completed);
        tracing::info!(
            bytes = summary.bytes,
            elapsed_secs = summary.elapsed.as_secs_f64(),
            "transfer complete"
        );
        Ok(summary)
    }

    /// Handshake: request at sequence 0, ack expected at sequence 1.
    async fn do_handshake(&self, stream: &mut TcpStream) -> Result<()> {
        let timeout = self.config.timeout_secs;

        io_timeout(
            timeout,
            exchange::send_message(
                stream,
                MessageType::HandshakeReq,
                0,
                &HandshakePayload::current().encode(),
            ),
        )
        .await?;

        let (header, payload) =
            io_timeout(timeout, exchange::recv_message(stream, HANDSHAKE_SIZE)).await?;
        if header.msg_type != MessageType::HandshakeAck {
            return Err(Error::UnexpectedMessage {
                expected: "HandshakeAck".to_string(),
                actual: format!("{:?}", header.msg_type),
            });
        }

        let ack = HandshakePayload::decode(&payload)?;
        if ack.version != PROTOCOL_VERSION {
            return Err(Error::VersionMismatch {
                expected: PROTOCOL_VERSION,
                actual: ack.version,
            });
        }

        tracing::debug!("handshake complete");
        Ok(())
    }

    /// Send `FILE_INFO` and wait for the receiver's verdict.
    async fn announce_file(
        &self,
        stream: &mut TcpStream,
        meta: &crate::file::SourceMetadata,
        total_chunks: u64,
        sequence: &mut u64,
    ) -> Result<()> {
        let timeout = self.config.timeout_secs;

        let info = FileInfo {
            filename: meta.filename.clone(),
            file_size: meta.size,
            total_chunks,
            chunk_size: self.config.chunk_size,
            checksum_type: ChecksumType::Sha256 as u8,
            file_checksum: [0u8; FILE_CHECKSUM_SIZE],
            file_mode: meta.mode,
            timestamp: meta.modified,
        };

        io_timeout(
            timeout,
            exchange::send_message(
                stream,
                MessageType::FileInfo,
                next_seq(sequence),
                &info.encode(),
            ),
        )
        .await?;

        let (header, payload) =
            io_timeout(timeout, exchange::recv_message(stream, ERROR_MESSAGE_SIZE)).await?;
        match header.msg_type {
            MessageType::FileAck => {
                let ack = FileAck::decode(&payload)?;
                if ack.status != 0 {
                    return Err(Error::PeerError {
                        code: ack.error_code,
                        message: describe_wire_code(ack.error_code).to_string(),
                    });
                }
                Ok(())
            }
            MessageType::Error => {
                let msg = ErrorMessage::decode(&payload)?;
                tracing::error!(code = msg.code, "receiver rejected file: {}", msg.message);
                Err(Error::PeerError {
                    code: msg.code,
                    message: msg.message,
                })
            }
            other => Err(Error::UnexpectedMessage {
                expected: "FileAck".to_string(),
                actual: format!("{other:?}"),
            }),
        }
    }

    /// Deliver one chunk, retransmitting on transient failures.
    async fn send_chunk_with_retry(
        &self,
        stream: &mut TcpStream,
        chunk_id: u64,
        offset: u64,
        data: &[u8],
        sequence: &mut u64,
    ) -> Result<()> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.exchange_chunk(stream, chunk_id, offset, data, sequence).await {
                Ok(true) => return Ok(()),
                Ok(false) => {
                    tracing::warn!(
                        chunk_id,
                        attempts,
                        max = self.config.max_retries,
                        "receiver requested retransmit"
                    );
                    if attempts >= self.config.max_retries {
                        return Err(Error::RetriesExhausted { chunk_id, attempts });
                    }
                }
                Err(e) if e.is_recoverable() => {
                    tracing::warn!(
                        chunk_id,
                        attempts,
                        max = self.config.max_retries,
                        "chunk exchange failed: {e}"
                    );
                    if attempts >= self.config.max_retries {
                        return Err(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One send/ack round trip. `Ok(true)` means the chunk is committed,
    /// `Ok(false)` means the receiver asked for a retransmit.
    async fn exchange_chunk(
        &self,
        stream: &mut TcpStream,
        chunk_id: u64,
        offset: u64,
        data: &[u8],
        sequence: &mut u64,
    ) -> Result<bool> {
        let timeout = self.config.timeout_secs;

        io_timeout(
            timeout,
            exchange::send_chunk(stream, chunk_id, offset, data, next_seq(sequence)),
        )
        .await?;

        let (header, payload) =
            io_timeout(timeout, exchange::recv_message(stream, ERROR_MESSAGE_SIZE)).await?;
        match header.msg_type {
            MessageType::ChunkAck => {
                let ack = ChunkAck::decode(&payload)?;
                if ack.chunk_id != chunk_id {
                    tracing::warn!(
                        acked = ack.chunk_id,
                        expected = chunk_id,
                        "ack for a different chunk; trusting its status"
                    );
                }
                Ok(ack.is_ok())
            }
            MessageType::Error => {
                let msg = ErrorMessage::decode(&payload)?;
                Err(Error::PeerError {
                    code: msg.code,
                    message: msg.message,
                })
            }
            other => Err(Error::UnexpectedMessage {
                expected: "ChunkAck".to_string(),
                actual: format!("{other:?}"),
            }),
        }
    }
}

/// The receiver role: accepts one transfer and writes the file atomically.
#[derive(Debug)]
pub struct ReceiveSession {
    listener: Listener,
    output_dir: PathBuf,
    config: TransferConfig,
    progress: ProgressChannel,
}

impl ReceiveSession {
    /// Bind a receive session to `port` (0 picks an ephemeral port),
    /// writing received files into `output_dir`.
    ///
    /// The output directory is created if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the port
    /// cannot be bound.
    pub async fn bind(port: u16, output_dir: PathBuf, config: TransferConfig) -> Result<Self> {
        tokio::fs::create_dir_all(&output_dir).await?;
        let listener = Listener::bind(port)?;

        Ok(Self {
            listener,
            output_dir,
            config,
            progress: ProgressChannel::new(),
        })
    }

    /// The port this session is listening on.
    ///
    /// # Errors
    ///
    /// Returns an error if the local address cannot be read.
    pub fn port(&self) -> Result<u16> {
        self.listener.local_port()
    }

    /// Get a progress receiver.
    #[must_use]
    pub fn progress(&self) -> watch::Receiver<TransferProgress> {
        self.progress.subscribe()
    }

    /// Accept one connection and run the transfer to completion.
    ///
    /// Returns the published path and the transfer statistics.
    ///
    /// # Errors
    ///
    /// Returns an error on any terminal fault; the temp file is removed
    /// before the error propagates.
    pub async fn run(&mut self) -> Result<(PathBuf, TransferSummary)> {
        let result = self.run_inner().await;
        if result.is_err() {
            self.progress.set_state(TransferState::Failed);
        }
        result
    }

    async fn run_inner(&mut self) -> Result<(PathBuf, TransferSummary)> {
        self.progress.set_state(TransferState::Waiting);

        let (mut stream, peer) = self.listener.accept().await?;
        self.progress.set_state(TransferState::Connected);
        tracing::info!(%peer, "client connected");

        self.do_handshake(&mut stream).await?;

        let mut sequence: u64 = 2;
        let info = self.receive_file_info(&mut stream).await?;

        tracing::info!(
            file = %info.filename,
            size = info.file_size,
            chunks = info.total_chunks,
            "receiving file"
        );

        let name = match sanitize_filename(&info.filename) {
            Ok(name) => name,
            Err(e) => {
                tracing::error!("rejected filename {:?}", info.filename);
                self.report_error(&mut stream, &e, 0, "Invalid filename", &mut sequence)
                    .await;
                return Err(e);
            }
        };

        let available = disk_available(&self.output_dir)?;
        if available < info.file_size {
            let e = Error::InsufficientSpace {
                needed: info.file_size,
                available,
            };
            self.report_error(&mut stream, &e, 0, "Insufficient disk space", &mut sequence)
                .await;
            return Err(e);
        }

        let mut writer = match TempFileWriter::create(&self.output_dir, &name).await {
            Ok(writer) => writer,
            Err(e) => {
                self.report_error(&mut stream, &e, 0, "Cannot create file", &mut sequence)
                    .await;
                return Err(e);
            }
        };

        io_timeout(
            self.config.timeout_secs,
            exchange::send_message(
                &mut stream,
                MessageType::FileAck,
                next_seq(&mut sequence),
                &FileAck::ready().encode(),
            ),
        )
        .await?;

        self.progress.begin(&name, info.total_chunks, info.file_size);
        let started = Instant::now();

        let received = self
            .receive_chunks(&mut stream, &mut writer, &info, &mut sequence)
            .await;

        match received {
            Ok(bytes) => {
                self.progress.set_state(TransferState::Finalizing);
                let path = writer.finalize(info.file_mode).await?;
                let summary = TransferSummary {
                    bytes,
                    chunks: info.total_chunks,
                    elapsed: started.elapsed(),
                };
                self.progress.set_state(TransferState::Completed);
                tracing::info!(path = %path.display(), bytes, "file received");
                Ok((path, summary))
            }
            Err(e) => {
                writer.discard().await;
                Err(e)
            }
        }
    }

    /// Handshake: validate the request, ack at `request_seq + 1`.
    async fn do_handshake(&self, stream: &mut TcpStream) -> Result<()> {
        let timeout = self.config.timeout_secs;

        let (header, payload) =
            io_timeout(timeout, exchange::recv_message(stream, HANDSHAKE_SIZE)).await?;
        if header.msg_type != MessageType::HandshakeReq {
            return Err(Error::UnexpectedMessage {
                expected: "HandshakeReq".to_string(),
                actual: format!("{:?}", header.msg_type),
            });
        }

        let req = HandshakePayload::decode(&payload)?;
        if req.version != PROTOCOL_VERSION {
            return Err(Error::VersionMismatch {
                expected: PROTOCOL_VERSION,
                actual: req.version,
            });
        }

        io_timeout(
            timeout,
            exchange::send_message(
                stream,
                MessageType::HandshakeAck,
                header.sequence + 1,
                &HandshakePayload::current().encode(),
            ),
        )
        .await?;

        tracing::debug!("handshake complete");
        Ok(())
    }

    /// Receive and validate the `FILE_INFO` announcement.
    async fn receive_file_info(&self, stream: &mut TcpStream) -> Result<FileInfo> {
        let (header, payload) = io_timeout(
            self.config.timeout_secs,
            exchange::recv_message(stream, FILE_INFO_SIZE),
        )
        .await?;
        if header.msg_type != MessageType::FileInfo {
            return Err(Error::UnexpectedMessage {
                expected: "FileInfo".to_string(),
                actual: format!("{:?}", header.msg_type),
            });
        }

        let info = FileInfo::decode(&payload)?;

        if info.chunk_size == 0 && info.file_size > 0 {
            return Err(Error::Protocol(
                "zero chunk size for a non-empty file".to_string(),
            ));
        }
        let expected_chunks = if info.chunk_size == 0 {
            0
        } else {
            info.file_size.div_ceil(u64::from(info.chunk_size))
        };
        if info.total_chunks != expected_chunks {
            return Err(Error::Protocol(format!(
                "chunk count mismatch: declared {}, expected {expected_chunks}",
                info.total_chunks
            )));
        }

        Ok(info)
    }

    /// The chunk loop. Returns the number of payload bytes written.
    ///
    /// Chunks must arrive in ascending order starting at 0; the sender
    /// guarantees this, so a violation is treated as a corrupt peer.
    async fn receive_chunks(
        &self,
        stream: &mut TcpStream,
        writer: &mut TempFileWriter,
        info: &FileInfo,
        sequence: &mut u64,
    ) -> Result<u64> {
        let timeout = self.config.timeout_secs;
        let mut received: u64 = 0;
        let mut bytes: u64 = 0;

        while received < info.total_chunks {
            match io_timeout(timeout, exchange::recv_chunk(stream, info.chunk_size)).await {
                Ok((header, data)) => {
                    if header.chunk_id != received {
                        let e = Error::Protocol(format!(
                            "out-of-order chunk {} (expected {received})",
                            header.chunk_id
                        ));
                        self.report_error(stream, &e, header.chunk_id, "Out-of-order chunk", sequence)
                            .await;
                        return Err(e);
                    }

                    if let Err(e) = writer.write_at(header.chunk_offset, &data).await {
                        self.report_error(stream, &e, header.chunk_id, "Write failed", sequence)
                            .await;
                        return Err(e);
                    }

                    io_timeout(
                        timeout,
                        exchange::send_message(
                            stream,
                            MessageType::ChunkAck,
                            next_seq(sequence),
                            &ChunkAck::ok(header.chunk_id).encode(),
                        ),
                    )
                    .await?;

                    received += 1;
                    bytes += u64::from(header.chunk_size);
                    self.progress.record_chunk(u64::from(header.chunk_size));
                }
                Err(Error::ChunkChecksum {
                    chunk_id,
                    expected,
                    computed,
                }) => {
                    tracing::warn!(
                        chunk_id,
                        "chunk failed verification (expected {expected:#010x}, computed {computed:#010x}), requesting retransmit"
                    );
                    io_timeout(
                        timeout,
                        exchange::send_message(
                            stream,
                            MessageType::ChunkAck,
                            next_seq(sequence),
                            &ChunkAck::retry(chunk_id).encode(),
                        ),
                    )
                    .await?;
                }
                Err(e) => {
                    self.report_error(stream, &e, received, "Receive failed", sequence)
                        .await;
                    return Err(e);
                }
            }
        }

        Ok(bytes)
    }

    /// Best-effort `MSG_ERROR` before tearing the session down.
    async fn report_error(
        &self,
        stream: &mut TcpStream,
        error: &Error,
        chunk_id: u64,
        message: &str,
        sequence: &mut u64,
    ) {
        let send = io_timeout(
            self.config.timeout_secs,
            exchange::send_error(stream, error.wire_code(), chunk_id, message, next_seq(sequence)),
        )
        .await;
        if let Err(e) = send {
            tracing::debug!("could not deliver error report: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_match_protocol_constants() {
        let config = TransferConfig::default();
        assert_eq!(config.chunk_size, 512 * 1024);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn progress_percentage() {
        let mut progress = TransferProgress::new();
        assert_eq!(progress.percentage(), 100.0); // empty transfer is done

        progress.total_bytes = 1000;
        progress.bytes_transferred = 250;
        assert_eq!(progress.percentage(), 25.0);
    }

    #[test]
    fn sequence_counter_post_increments() {
        let mut seq = 2;
        assert_eq!(next_seq(&mut seq), 2);
        assert_eq!(next_seq(&mut seq), 3);
        assert_eq!(seq, 4);
    }

    #[test]
    fn summary_throughput() {
        let summary = TransferSummary {
            bytes: 10_000_000,
            chunks: 20,
            elapsed: Duration::from_secs(2),
        };
        assert!((summary.throughput_mbps() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn chunk_math_covers_edge_sizes() {
        // The same arithmetic the sender uses to slice the file.
        let cases: &[(u64, u32, u64)] = &[
            (0, 524_288, 0),
            (1, 524_288, 1),
            (524_288, 524_288, 1),
            (1_048_576, 524_288, 2),
            (700_000, 524_288, 2),
        ];
        for &(file_size, chunk_size, expected) in cases {
            assert_eq!(file_size.div_ceil(u64::from(chunk_size)), expected);
        }

        // Last-chunk size for the non-multiple case.
        let file_size: u64 = 700_000;
        let chunk_size: u64 = 524_288;
        let last = file_size - (file_size / chunk_size) * chunk_size;
        assert_eq!(last, 175_712);
    }
}
