//! FTCP wire protocol implementation.
//!
//! Every message on the wire is a fixed 32-byte header followed by exactly
//! `payload_size` payload bytes.
//!
//! ## Frame Format
//!
//! ```text
//! Offset  Size   Field
//! ──────  ─────  ──────────────
//!   0       4    magic           0x46544350 ("FTCP")
//!   4       1    version         0x01
//!   5       1    msg_type
//!   6       2    flags           0
//!   8       8    sequence_num
//!  16       8    payload_size
//!  24       4    header_crc32    CRC-32 over bytes 0..24
//!  28       4    reserved        0
//! ──────  ─────  ──────────────
//! Total:  32 bytes
//! ```
//!
//! All multi-byte fields are **big-endian** on the wire, regardless of host
//! byte order. Structures are packed: fields live at their declared offsets
//! with no alignment padding, so encode/decode work field-at-offset instead
//! of casting through in-memory structs.
//!
//! The codec in this module does *not* verify the header CRC during decode;
//! [`exchange`] recomputes it on every received frame before trusting
//! `payload_size`.

pub mod exchange;

use crate::checksum::crc32;
use crate::error::{Error, Result};
use crate::{MAX_FILENAME_LEN, PROTOCOL_MAGIC, PROTOCOL_VERSION};

/// Fixed size of the on-wire message header.
pub const HEADER_SIZE: usize = 32;

/// Fixed size of the `FILE_INFO` payload.
pub const FILE_INFO_SIZE: usize = 1024;

/// Fixed size of the chunk header inside a `CHUNK_DATA` payload.
pub const CHUNK_HEADER_SIZE: usize = 24;

/// Fixed size of the handshake payload.
pub const HANDSHAKE_SIZE: usize = 4;

/// Fixed size of the `FILE_ACK` payload.
pub const FILE_ACK_SIZE: usize = 4;

/// Fixed size of the `CHUNK_ACK` payload.
pub const CHUNK_ACK_SIZE: usize = 12;

/// Fixed size of the `ERROR` payload.
pub const ERROR_MESSAGE_SIZE: usize = 256;

/// Length of the message text field inside an [`ErrorMessage`].
pub const ERROR_TEXT_LEN: usize = 247;

/// Size of the reserved whole-file checksum field in [`FileInfo`].
pub const FILE_CHECKSUM_SIZE: usize = 32;

/// Message types in the FTCP protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    /// Sender initiates the connection
    HandshakeReq = 0x01,
    /// Receiver acknowledges the handshake
    HandshakeAck = 0x02,
    /// File metadata
    FileInfo = 0x03,
    /// Receiver is ready for chunks
    FileAck = 0x04,
    /// Chunk header plus chunk bytes
    ChunkData = 0x05,
    /// Receiver's verdict on a chunk
    ChunkAck = 0x06,
    /// All chunks sent (reserved, not yet emitted)
    TransferComplete = 0x07,
    /// Request final verification (reserved)
    VerifyRequest = 0x08,
    /// Verification result (reserved)
    VerifyResponse = 0x09,
    /// Terminal fault report
    Error = 0xFF,
}

impl MessageType {
    /// Parse a message type from a byte.
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::HandshakeReq),
            0x02 => Some(Self::HandshakeAck),
            0x03 => Some(Self::FileInfo),
            0x04 => Some(Self::FileAck),
            0x05 => Some(Self::ChunkData),
            0x06 => Some(Self::ChunkAck),
            0x07 => Some(Self::TransferComplete),
            0x08 => Some(Self::VerifyRequest),
            0x09 => Some(Self::VerifyResponse),
            0xFF => Some(Self::Error),
            _ => None,
        }
    }
}

/// Checksum algorithms declarable in [`FileInfo::checksum_type`].
///
/// Only [`ChecksumType::Crc32`] is exercised today; the others are parsed
/// and ignored so future peers can announce them without breaking us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChecksumType {
    /// Per-chunk CRC-32 (the only one in use)
    Crc32 = 0,
    /// Whole-file MD5 (reserved)
    Md5 = 1,
    /// Whole-file SHA-256 (reserved)
    Sha256 = 2,
}

impl ChecksumType {
    /// Parse a checksum type from a byte.
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Crc32),
            1 => Some(Self::Md5),
            2 => Some(Self::Sha256),
            _ => None,
        }
    }
}

/// The 32-byte frame preamble carried by every protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    /// Message type
    pub msg_type: MessageType,
    /// Reserved flags, always zero in this revision
    pub flags: u16,
    /// Per-side monotonically increasing sequence number
    pub sequence: u64,
    /// Exact number of payload bytes following this header
    pub payload_size: u64,
}

impl MessageHeader {
    /// Create a header with zeroed flags.
    #[must_use]
    pub const fn new(msg_type: MessageType, sequence: u64, payload_size: u64) -> Self {
        Self {
            msg_type,
            flags: 0,
            sequence,
            payload_size,
        }
    }

    /// Encode the header to its 32-byte wire form.
    ///
    /// Fills offsets 0..24, computes the CRC-32 over those bytes, stores it
    /// at offset 24, and zeroes the reserved word at 28.
    #[must_use]
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&PROTOCOL_MAGIC.to_be_bytes());
        buf[4] = PROTOCOL_VERSION;
        buf[5] = self.msg_type as u8;
        buf[6..8].copy_from_slice(&self.flags.to_be_bytes());
        buf[8..16].copy_from_slice(&self.sequence.to_be_bytes());
        buf[16..24].copy_from_slice(&self.payload_size.to_be_bytes());
        let crc = crc32(&buf[..24]);
        buf[24..28].copy_from_slice(&crc.to_be_bytes());
        // reserved word at 28..32 stays zero
        buf
    }

    /// Decode a header from its 32-byte wire form.
    ///
    /// Validates magic, version, and message type. The stored CRC is *not*
    /// checked here; use [`stored_header_crc`] and recompute over
    /// `buf[..24]` before trusting `payload_size`.
    ///
    /// # Errors
    ///
    /// Returns an error on bad magic, unsupported version, or an unknown
    /// message type (`0x00` included).
    pub fn decode(buf: &[u8; HEADER_SIZE]) -> Result<Self> {
        let magic = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
        if magic != PROTOCOL_MAGIC {
            return Err(Error::Protocol(format!("invalid magic: {magic:#010x}")));
        }

        let version = buf[4];
        if version != PROTOCOL_VERSION {
            return Err(Error::VersionMismatch {
                expected: PROTOCOL_VERSION,
                actual: version,
            });
        }

        let msg_type = MessageType::from_byte(buf[5]).ok_or(Error::InvalidMessageType(buf[5]))?;

        Ok(Self {
            msg_type,
            flags: u16::from_be_bytes([buf[6], buf[7]]),
            sequence: u64::from_be_bytes(buf[8..16].try_into().expect("8-byte slice")),
            payload_size: u64::from_be_bytes(buf[16..24].try_into().expect("8-byte slice")),
        })
    }
}

/// Read the CRC-32 a serialized header stored at offset 24.
#[must_use]
pub fn stored_header_crc(buf: &[u8; HEADER_SIZE]) -> u32 {
    u32::from_be_bytes([buf[24], buf[25], buf[26], buf[27]])
}

/// Handshake request/ack payload (4 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakePayload {
    /// Protocol version the sender speaks
    pub version: u8,
    /// Reserved capability bits, zero in this revision
    pub capabilities: u8,
}

impl HandshakePayload {
    /// Handshake payload for the current protocol version.
    #[must_use]
    pub const fn current() -> Self {
        Self {
            version: PROTOCOL_VERSION,
            capabilities: 0,
        }
    }

    /// Encode to the 4-byte wire form.
    #[must_use]
    pub fn encode(&self) -> [u8; HANDSHAKE_SIZE] {
        let mut buf = [0u8; HANDSHAKE_SIZE];
        buf[0] = self.version;
        buf[1] = self.capabilities;
        // u16 reserved stays zero
        buf
    }

    /// Decode from the wire form.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is shorter than 4 bytes.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < HANDSHAKE_SIZE {
            return Err(Error::Protocol("handshake payload too short".to_string()));
        }
        Ok(Self {
            version: buf[0],
            capabilities: buf[1],
        })
    }
}

/// The 1024-byte descriptor of the file being transferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Base name of the file, UTF-8, at most 255 bytes
    pub filename: String,
    /// Total file size in bytes
    pub file_size: u64,
    /// Total number of chunks (`ceil(file_size / chunk_size)`)
    pub total_chunks: u64,
    /// Size of every chunk except possibly the last
    pub chunk_size: u32,
    /// Declared whole-file checksum algorithm (see [`ChecksumType`])
    pub checksum_type: u8,
    /// Whole-file checksum, zeroed in this revision
    pub file_checksum: [u8; FILE_CHECKSUM_SIZE],
    /// Unix-style file permissions
    pub file_mode: u32,
    /// File modification time, seconds since epoch
    pub timestamp: u64,
}

impl FileInfo {
    /// Encode to the 1024-byte wire form.
    ///
    /// The filename is written null-terminated and zero-padded into its
    /// 256-byte field; anything past 255 bytes is truncated (the sender
    /// rejects such names before it gets here).
    #[must_use]
    pub fn encode(&self) -> [u8; FILE_INFO_SIZE] {
        let mut buf = [0u8; FILE_INFO_SIZE];

        let name = self.filename.as_bytes();
        let name_len = name.len().min(MAX_FILENAME_LEN - 1);
        #[allow(clippy::cast_possible_truncation)]
        buf[0..2].copy_from_slice(&(name_len as u16).to_be_bytes());
        buf[2..2 + name_len].copy_from_slice(&name[..name_len]);

        let mut off = 2 + MAX_FILENAME_LEN;
        buf[off..off + 8].copy_from_slice(&self.file_size.to_be_bytes());
        off += 8;
        buf[off..off + 8].copy_from_slice(&self.total_chunks.to_be_bytes());
        off += 8;
        buf[off..off + 4].copy_from_slice(&self.chunk_size.to_be_bytes());
        off += 4;
        buf[off] = self.checksum_type;
        off += 1;
        buf[off..off + FILE_CHECKSUM_SIZE].copy_from_slice(&self.file_checksum);
        off += FILE_CHECKSUM_SIZE;
        buf[off..off + 4].copy_from_slice(&self.file_mode.to_be_bytes());
        off += 4;
        buf[off..off + 8].copy_from_slice(&self.timestamp.to_be_bytes());
        // reserved tail stays zero

        buf
    }

    /// Decode from the 1024-byte wire form.
    ///
    /// Reserved bytes are ignored. The filename is read up to the declared
    /// length, clamped to the field, and truncated at the first NUL; invalid
    /// UTF-8 is replaced rather than rejected (sanitization happens later).
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is shorter than [`FILE_INFO_SIZE`].
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < FILE_INFO_SIZE {
            return Err(Error::Protocol("file info payload too short".to_string()));
        }

        let declared_len = u16::from_be_bytes([buf[0], buf[1]]) as usize;
        let name_field = &buf[2..2 + MAX_FILENAME_LEN];
        let end = declared_len
            .min(MAX_FILENAME_LEN - 1)
            .min(name_field.iter().position(|&b| b == 0).unwrap_or(MAX_FILENAME_LEN));
        let filename = String::from_utf8_lossy(&name_field[..end]).into_owned();

        let mut off = 2 + MAX_FILENAME_LEN;
        let file_size = u64::from_be_bytes(buf[off..off + 8].try_into().expect("8-byte slice"));
        off += 8;
        let total_chunks = u64::from_be_bytes(buf[off..off + 8].try_into().expect("8-byte slice"));
        off += 8;
        let chunk_size = u32::from_be_bytes(buf[off..off + 4].try_into().expect("4-byte slice"));
        off += 4;
        let checksum_type = buf[off];
        off += 1;
        let file_checksum: [u8; FILE_CHECKSUM_SIZE] = buf[off..off + FILE_CHECKSUM_SIZE]
            .try_into()
            .expect("32-byte slice");
        off += FILE_CHECKSUM_SIZE;
        let file_mode = u32::from_be_bytes(buf[off..off + 4].try_into().expect("4-byte slice"));
        off += 4;
        let timestamp = u64::from_be_bytes(buf[off..off + 8].try_into().expect("8-byte slice"));

        Ok(Self {
            filename,
            file_size,
            total_chunks,
            chunk_size,
            checksum_type,
            file_checksum,
            file_mode,
            timestamp,
        })
    }
}

/// File acknowledgment payload (4 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileAck {
    /// 0 = ready, 1 = error
    pub status: u8,
    /// Wire error code when `status != 0`
    pub error_code: i8,
}

impl FileAck {
    /// The "ready to receive" acknowledgment.
    #[must_use]
    pub const fn ready() -> Self {
        Self {
            status: 0,
            error_code: 0,
        }
    }

    /// Encode to the 4-byte wire form.
    #[must_use]
    pub fn encode(&self) -> [u8; FILE_ACK_SIZE] {
        let mut buf = [0u8; FILE_ACK_SIZE];
        buf[0] = self.status;
        buf[1] = self.error_code as u8;
        buf
    }

    /// Decode from the wire form.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is shorter than 4 bytes.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < FILE_ACK_SIZE {
            return Err(Error::Protocol("file ack payload too short".to_string()));
        }
        Ok(Self {
            status: buf[0],
            error_code: buf[1] as i8,
        })
    }
}

/// The 24-byte descriptor preceding chunk bytes inside a `CHUNK_DATA` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// 0-based chunk sequence number
    pub chunk_id: u64,
    /// Byte offset of this chunk within the file
    pub chunk_offset: u64,
    /// Actual size of this chunk in bytes
    pub chunk_size: u32,
    /// CRC-32 over the chunk bytes only
    pub chunk_crc32: u32,
}

impl ChunkHeader {
    /// Encode to the 24-byte wire form.
    #[must_use]
    pub fn encode(&self) -> [u8; CHUNK_HEADER_SIZE] {
        let mut buf = [0u8; CHUNK_HEADER_SIZE];
        buf[0..8].copy_from_slice(&self.chunk_id.to_be_bytes());
        buf[8..16].copy_from_slice(&self.chunk_offset.to_be_bytes());
        buf[16..20].copy_from_slice(&self.chunk_size.to_be_bytes());
        buf[20..24].copy_from_slice(&self.chunk_crc32.to_be_bytes());
        buf
    }

    /// Decode from the wire form.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is shorter than 24 bytes.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < CHUNK_HEADER_SIZE {
            return Err(Error::Protocol("chunk header too short".to_string()));
        }
        Ok(Self {
            chunk_id: u64::from_be_bytes(buf[0..8].try_into().expect("8-byte slice")),
            chunk_offset: u64::from_be_bytes(buf[8..16].try_into().expect("8-byte slice")),
            chunk_size: u32::from_be_bytes(buf[16..20].try_into().expect("4-byte slice")),
            chunk_crc32: u32::from_be_bytes(buf[20..24].try_into().expect("4-byte slice")),
        })
    }
}

/// Chunk acknowledgment payload (12 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkAck {
    /// Chunk being acknowledged
    pub chunk_id: u64,
    /// 0 = OK, 1 = retransmit requested
    pub status: u8,
}

impl ChunkAck {
    /// Acknowledgment accepting the chunk.
    #[must_use]
    pub const fn ok(chunk_id: u64) -> Self {
        Self {
            chunk_id,
            status: 0,
        }
    }

    /// Acknowledgment requesting a retransmit.
    #[must_use]
    pub const fn retry(chunk_id: u64) -> Self {
        Self {
            chunk_id,
            status: 1,
        }
    }

    /// Whether the receiver accepted the chunk.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == 0
    }

    /// Encode to the 12-byte wire form.
    #[must_use]
    pub fn encode(&self) -> [u8; CHUNK_ACK_SIZE] {
        let mut buf = [0u8; CHUNK_ACK_SIZE];
        buf[0..8].copy_from_slice(&self.chunk_id.to_be_bytes());
        buf[8] = self.status;
        buf
    }

    /// Decode from the wire form.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is shorter than 12 bytes.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < CHUNK_ACK_SIZE {
            return Err(Error::Protocol("chunk ack payload too short".to_string()));
        }
        Ok(Self {
            chunk_id: u64::from_be_bytes(buf[0..8].try_into().expect("8-byte slice")),
            status: buf[8],
        })
    }
}

/// Structured terminal fault report (256 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    /// Wire error code
    pub code: i8,
    /// Chunk the fault relates to, zero when not applicable
    pub chunk_id: u64,
    /// Human-readable description, at most 246 bytes
    pub message: String,
}

impl ErrorMessage {
    /// Create an error message, truncating the text to fit its field.
    #[must_use]
    pub fn new(code: i8, chunk_id: u64, message: &str) -> Self {
        let mut text = message.to_string();
        text.truncate(ERROR_TEXT_LEN - 1);
        Self {
            code,
            chunk_id,
            message: text,
        }
    }

    /// Encode to the 256-byte wire form.
    #[must_use]
    pub fn encode(&self) -> [u8; ERROR_MESSAGE_SIZE] {
        let mut buf = [0u8; ERROR_MESSAGE_SIZE];
        buf[0] = self.code as u8;
        buf[1..9].copy_from_slice(&self.chunk_id.to_be_bytes());
        let text = self.message.as_bytes();
        let len = text.len().min(ERROR_TEXT_LEN - 1);
        buf[9..9 + len].copy_from_slice(&text[..len]);
        buf
    }

    /// Decode from the wire form, truncating the text at the first NUL.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is shorter than 256 bytes.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < ERROR_MESSAGE_SIZE {
            return Err(Error::Protocol("error payload too short".to_string()));
        }
        let text = &buf[9..9 + ERROR_TEXT_LEN];
        let end = text.iter().position(|&b| b == 0).unwrap_or(ERROR_TEXT_LEN);
        Ok(Self {
            code: buf[0] as i8,
            chunk_id: u64::from_be_bytes(buf[1..9].try_into().expect("8-byte slice")),
            message: String::from_utf8_lossy(&text[..end]).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_roundtrip() {
        let header = MessageHeader::new(MessageType::ChunkData, 7, 524_312);
        let encoded = header.encode();
        let decoded = MessageHeader::decode(&encoded).expect("decode");
        assert_eq!(decoded, header);
    }

    #[test]
    fn header_crc_covers_first_24_bytes() {
        let header = MessageHeader::new(MessageType::FileInfo, 2, 1024);
        let encoded = header.encode();
        assert_eq!(stored_header_crc(&encoded), crc32(&encoded[..24]));
    }

    #[test]
    fn header_layout_offsets() {
        let header = MessageHeader::new(MessageType::HandshakeReq, 0, 4);
        let buf = header.encode();
        assert_eq!(&buf[0..4], &[0x46, 0x54, 0x43, 0x50]);
        assert_eq!(buf[4], 0x01);
        assert_eq!(buf[5], 0x01);
        assert_eq!(&buf[6..8], &[0, 0]);
        assert_eq!(&buf[16..24], &4u64.to_be_bytes());
        assert_eq!(&buf[28..32], &[0, 0, 0, 0]);
    }

    #[test]
    fn header_rejects_bad_magic() {
        let mut buf = MessageHeader::new(MessageType::FileAck, 3, 4).encode();
        buf[0] = b'X';
        assert!(matches!(
            MessageHeader::decode(&buf),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn header_rejects_bad_version() {
        let mut buf = MessageHeader::new(MessageType::FileAck, 3, 4).encode();
        buf[4] = 0x02;
        assert!(matches!(
            MessageHeader::decode(&buf),
            Err(Error::VersionMismatch {
                expected: 0x01,
                actual: 0x02
            })
        ));
    }

    #[test]
    fn header_rejects_unknown_types() {
        let mut buf = MessageHeader::new(MessageType::FileAck, 3, 4).encode();
        buf[5] = 0x00;
        assert!(matches!(
            MessageHeader::decode(&buf),
            Err(Error::InvalidMessageType(0x00))
        ));

        buf[5] = 0x42;
        assert!(matches!(
            MessageHeader::decode(&buf),
            Err(Error::InvalidMessageType(0x42))
        ));
    }

    #[test]
    fn error_type_is_always_valid() {
        let mut buf = MessageHeader::new(MessageType::FileAck, 3, 256).encode();
        buf[5] = 0xFF;
        let decoded = MessageHeader::decode(&buf).expect("0xFF is valid");
        assert_eq!(decoded.msg_type, MessageType::Error);
    }

    #[test]
    fn handshake_roundtrip() {
        let hs = HandshakePayload::current();
        let decoded = HandshakePayload::decode(&hs.encode()).expect("decode");
        assert_eq!(decoded, hs);
        assert_eq!(decoded.version, PROTOCOL_VERSION);
    }

    #[test]
    fn file_info_roundtrip() {
        let info = FileInfo {
            filename: "archive-2024.tar.gz".to_string(),
            file_size: 700_000,
            total_chunks: 2,
            chunk_size: 524_288,
            checksum_type: ChecksumType::Sha256 as u8,
            file_checksum: [0u8; FILE_CHECKSUM_SIZE],
            file_mode: 0o644,
            timestamp: 1_700_000_000,
        };
        let encoded = info.encode();
        assert_eq!(encoded.len(), FILE_INFO_SIZE);
        let decoded = FileInfo::decode(&encoded).expect("decode");
        assert_eq!(decoded, info);
    }

    #[test]
    fn file_info_filename_is_null_terminated() {
        let info = FileInfo {
            filename: "a".repeat(300),
            file_size: 1,
            total_chunks: 1,
            chunk_size: 524_288,
            checksum_type: 0,
            file_checksum: [0u8; FILE_CHECKSUM_SIZE],
            file_mode: 0,
            timestamp: 0,
        };
        let encoded = info.encode();
        // Field is 256 bytes; content is clamped to 255 so the terminator survives.
        assert_eq!(encoded[2 + 255], 0);
        let decoded = FileInfo::decode(&encoded).expect("decode");
        assert_eq!(decoded.filename.len(), 255);
    }

    #[test]
    fn file_info_reserved_tail_is_zero() {
        let info = FileInfo {
            filename: "f".to_string(),
            file_size: 0,
            total_chunks: 0,
            chunk_size: 524_288,
            checksum_type: 0,
            file_checksum: [0u8; FILE_CHECKSUM_SIZE],
            file_mode: 0,
            timestamp: 0,
        };
        let encoded = info.encode();
        assert!(encoded[323..].iter().all(|&b| b == 0));
    }

    #[test]
    fn chunk_header_roundtrip() {
        let hdr = ChunkHeader {
            chunk_id: 3,
            chunk_offset: 3 * 524_288,
            chunk_size: 175_712,
            chunk_crc32: 0xDEAD_BEEF,
        };
        let decoded = ChunkHeader::decode(&hdr.encode()).expect("decode");
        assert_eq!(decoded, hdr);
    }

    #[test]
    fn chunk_ack_roundtrip() {
        let ack = ChunkAck::retry(42);
        let encoded = ack.encode();
        assert_eq!(encoded.len(), CHUNK_ACK_SIZE);
        let decoded = ChunkAck::decode(&encoded).expect("decode");
        assert_eq!(decoded, ack);
        assert!(!decoded.is_ok());
        assert!(ChunkAck::ok(42).is_ok());
    }

    #[test]
    fn error_message_roundtrip() {
        let msg = ErrorMessage::new(-14, 0, "Insufficient disk space");
        let encoded = msg.encode();
        assert_eq!(encoded.len(), ERROR_MESSAGE_SIZE);
        let decoded = ErrorMessage::decode(&encoded).expect("decode");
        assert_eq!(decoded, msg);
        assert_eq!(decoded.code, -14);
    }

    #[test]
    fn error_message_truncates_long_text() {
        let msg = ErrorMessage::new(-12, 9, &"x".repeat(400));
        let decoded = ErrorMessage::decode(&msg.encode()).expect("decode");
        assert_eq!(decoded.message.len(), ERROR_TEXT_LEN - 1);
        assert_eq!(decoded.chunk_id, 9);
    }
}
