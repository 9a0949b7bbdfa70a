//! Error types for FTCP.
//!
//! This module provides a unified error type for all FTCP operations, with
//! specific variants for network, file, protocol, and resource failures.
//!
//! Internally errors are plain Rust enum variants; the numeric codes of the
//! wire protocol only appear inside `MSG_ERROR` payloads and
//! `FileAck.error_code`, via [`Error::wire_code`].

use std::io;

use thiserror::Error;

/// A specialized `Result` type for FTCP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for FTCP.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection could not be established after all attempts
    #[error("failed to connect to {host}:{port} after {attempts} attempts")]
    Connect {
        /// Host the sender tried to reach
        host: String,
        /// Port the sender tried to reach
        port: u16,
        /// Number of attempts made
        attempts: u32,
    },

    /// Hostname did not resolve to any address
    #[error("failed to resolve host '{0}'")]
    Resolve(String),

    /// Listener could not bind to the requested port
    #[error("failed to bind to port {port}: {source}")]
    Bind {
        /// Port the receiver tried to listen on
        port: u16,
        /// Underlying socket error
        source: io::Error,
    },

    /// Accepting an inbound connection failed
    #[error("failed to accept connection: {0}")]
    Accept(#[source] io::Error),

    /// Peer closed the connection before a full frame was read
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// A network wait exceeded the socket timeout
    #[error("operation timed out after {0} seconds")]
    Timeout(u64),

    /// Source or destination file could not be opened
    #[error("cannot open '{path}': {source}")]
    FileOpen {
        /// Path that failed to open
        path: String,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Reading the source file returned fewer bytes than expected
    #[error("short read from '{path}': wanted {expected} bytes, got {got}")]
    FileRead {
        /// Source path
        path: String,
        /// Bytes requested
        expected: usize,
        /// Bytes actually read
        got: usize,
    },

    /// Writing a chunk to the destination failed
    #[error("cannot write to '{path}': {source}")]
    FileWrite {
        /// Destination path
        path: String,
        /// Underlying I/O error
        source: io::Error,
    },

    /// The transferred path is not a regular file
    #[error("not a regular file: {0}")]
    NotAFile(String),

    /// Insufficient disk space in the output directory
    #[error("insufficient disk space: need {needed} bytes, have {available} bytes")]
    InsufficientSpace {
        /// Bytes required for the incoming file
        needed: u64,
        /// Bytes available on the target filesystem
        available: u64,
    },

    /// Header CRC-32 did not match the serialized header bytes
    #[error("header checksum mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    HeaderChecksum {
        /// CRC stored in the header
        expected: u32,
        /// CRC recomputed over the received bytes
        computed: u32,
    },

    /// Chunk data CRC-32 did not match the chunk header
    #[error("checksum mismatch for chunk {chunk_id}: expected {expected:#010x}, computed {computed:#010x}")]
    ChunkChecksum {
        /// Chunk that failed verification
        chunk_id: u64,
        /// CRC declared by the sender
        expected: u32,
        /// CRC recomputed over the received data
        computed: u32,
    },

    /// A chunk could not be delivered within the retry budget
    #[error("chunk {chunk_id} failed after {attempts} attempts")]
    RetriesExhausted {
        /// Chunk that kept failing
        chunk_id: u64,
        /// Attempts made before giving up
        attempts: u32,
    },

    /// Malformed or out-of-order protocol traffic
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Peer speaks a different protocol version
    #[error("protocol version mismatch: expected {expected:#04x}, got {actual:#04x}")]
    VersionMismatch {
        /// Version this implementation speaks
        expected: u8,
        /// Version the peer announced
        actual: u8,
    },

    /// Header carried an unknown message type
    #[error("invalid message type: {0:#04x}")]
    InvalidMessageType(u8),

    /// A well-formed message arrived where a different type was required
    #[error("unexpected message type: expected {expected}, got {actual}")]
    UnexpectedMessage {
        /// Message type the state machine was waiting for
        expected: String,
        /// Message type actually received
        actual: String,
    },

    /// Declared payload size exceeds what the receiver is willing to read
    #[error("payload too large: {size} bytes (maximum {max})")]
    PayloadTooLarge {
        /// Declared payload size
        size: u64,
        /// Maximum the caller allows
        max: u64,
    },

    /// Declared filename failed sanitization
    #[error("invalid filename: {0:?}")]
    InvalidFilename(String),

    /// Filename does not fit the wire format's 256-byte field
    #[error("filename too long: {0:?}")]
    FilenameTooLong(String),

    /// Peer reported a terminal fault via `MSG_ERROR`
    #[error("peer error ({}): {message}", describe_wire_code(*.code))]
    PeerError {
        /// Wire error code carried by the peer
        code: i8,
        /// Human-readable message carried by the peer
        message: String,
    },

    /// Configuration file error
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns the numeric code this error travels under in `MSG_ERROR`
    /// payloads and `FileAck.error_code`.
    #[must_use]
    pub const fn wire_code(&self) -> i8 {
        match self {
            Self::Connect { .. } | Self::Resolve(_) => -2,
            Self::Bind { .. } => -3,
            Self::Accept(_) => -5,
            Self::ConnectionClosed => -7,
            Self::Timeout(_) => -8,
            Self::FileOpen { .. } => -10,
            Self::FileRead { .. } => -11,
            Self::FileWrite { .. } => -12,
            Self::InsufficientSpace { .. } => -14,
            Self::HeaderChecksum { .. }
            | Self::ChunkChecksum { .. }
            | Self::RetriesExhausted { .. } => -20,
            Self::Protocol(_)
            | Self::UnexpectedMessage { .. }
            | Self::PayloadTooLarge { .. } => -21,
            Self::VersionMismatch { .. } => -22,
            Self::InvalidMessageType(_) => -23,
            Self::NotAFile(_) | Self::InvalidFilename(_) => -31,
            Self::FilenameTooLong(_) => -33,
            Self::PeerError { code, .. } => *code,
            Self::Config(_) => -31,
            Self::Io(_) => -1,
        }
    }

    /// Returns whether this error is recoverable by the per-chunk retry loop.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::ChunkChecksum { .. } | Self::HeaderChecksum { .. }
        )
    }
}

/// Human-readable description for a wire error code.
///
/// Unknown codes (including codes minted by future peers) map to
/// `"Unknown error"` rather than failing.
#[must_use]
pub const fn describe_wire_code(code: i8) -> &'static str {
    match code {
        0 => "Success",
        -1 => "Socket error",
        -2 => "Connection failed",
        -3 => "Bind failed",
        -4 => "Listen failed",
        -5 => "Accept failed",
        -6 => "Send failed",
        -7 => "Receive failed",
        -8 => "Operation timed out",
        -10 => "File open failed",
        -11 => "File read failed",
        -12 => "File write failed",
        -13 => "File seek failed",
        -14 => "Disk full",
        -15 => "Permission denied",
        -20 => "Checksum mismatch",
        -21 => "Protocol error",
        -22 => "Version mismatch",
        -23 => "Invalid message",
        -30 => "Out of memory",
        -31 => "Invalid argument",
        -32 => "File not found",
        -33 => "Filename too long",
        _ => "Unknown error",
    }
}
