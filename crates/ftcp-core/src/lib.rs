//! # FTCP Core Library
//!
//! `ftcp-core` implements the FTCP wire protocol and transfer engine for
//! point-to-point file transfers over TCP.
//!
//! A sender uploads a single file to a receiver that accepts one client at
//! a time and materializes the file atomically in its output directory.
//! Files are split into fixed-size chunks; every chunk is individually
//! framed, CRC-checked, and acknowledged before the next one is sent.
//!
//! ## Modules
//!
//! - [`checksum`] - CRC-32 primitive used by headers and chunk payloads
//! - [`config`] - Configuration management
//! - [`mod@file`] - Source reading, temp-file writing, filename sanitization
//! - [`protocol`] - Wire format: frame codec and typed message exchange
//! - [`transfer`] - Sender and receiver state machines
//! - [`transport`] - Connection setup, listener, and timed socket I/O
//!
//! ## Example
//!
//! ```rust,ignore
//! use ftcp_core::transfer::{ReceiveSession, SendSession, TransferConfig};
//!
//! // Receiving side
//! let mut receiver = ReceiveSession::bind(8080, "downloads".into(), TransferConfig::default()).await?;
//! let (path, _) = receiver.run().await?;
//!
//! // Sending side
//! let mut sender = SendSession::new("192.168.1.10".into(), 8080, "video.mkv".into(), TransferConfig::default());
//! let summary = sender.run().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

pub mod checksum;
pub mod config;
pub mod error;
pub mod file;
pub mod protocol;
pub mod transfer;
pub mod transport;

pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol magic number, `"FTCP"` as a big-endian u32.
pub const PROTOCOL_MAGIC: u32 = 0x4654_4350;

/// Protocol version carried in every header and in the handshake.
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Default TCP port for transfers
pub const DEFAULT_PORT: u16 = 8080;

/// Default chunk size for file transfers (512 KB)
pub const DEFAULT_CHUNK_SIZE: u32 = 512 * 1024;

/// Maximum attempts per chunk before the transfer is abandoned
pub const MAX_CHUNK_RETRIES: u32 = 3;

/// Default socket timeout in seconds, applied to every network wait
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of connection attempts for the sender
pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 5;

/// Initial connect backoff delay in milliseconds
pub const CONNECT_BACKOFF_INITIAL_MS: u64 = 1000;

/// Connect backoff cap in milliseconds
pub const CONNECT_BACKOFF_MAX_MS: u64 = 16_000;

/// Maximum filename field length on the wire (including the terminator)
pub const MAX_FILENAME_LEN: usize = 256;
