//! Typed message exchange on top of the frame codec.
//!
//! These functions move whole protocol messages over any async byte stream.
//! Every received frame gets its header CRC recomputed before the declared
//! `payload_size` is trusted, so a corrupted length field can never steer
//! the reader into an attacker-chosen read.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::checksum::crc32;
use crate::error::{Error, Result};
use crate::protocol::{
    stored_header_crc, ChunkHeader, ErrorMessage, MessageHeader, MessageType, CHUNK_HEADER_SIZE,
    HEADER_SIZE,
};

/// Read exactly `buf.len()` bytes, mapping a peer close to
/// [`Error::ConnectionClosed`].
async fn read_full<R>(reader: &mut R, buf: &mut [u8]) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    reader.read_exact(buf).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::ConnectionClosed
        } else {
            Error::Io(e)
        }
    })?;
    Ok(())
}

/// Read and validate a frame header, including its CRC.
async fn read_header<R>(reader: &mut R) -> Result<MessageHeader>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; HEADER_SIZE];
    read_full(reader, &mut buf).await?;

    let header = MessageHeader::decode(&buf)?;

    let computed = crc32(&buf[..24]);
    let stored = stored_header_crc(&buf);
    if computed != stored {
        return Err(Error::HeaderChecksum {
            expected: stored,
            computed,
        });
    }

    Ok(header)
}

/// Send one protocol message: header followed by `payload`.
///
/// # Errors
///
/// Returns an error if the stream write fails.
pub async fn send_message<W>(
    writer: &mut W,
    msg_type: MessageType,
    sequence: u64,
    payload: &[u8],
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let header = MessageHeader::new(msg_type, sequence, payload.len() as u64);
    writer.write_all(&header.encode()).await?;
    if !payload.is_empty() {
        writer.write_all(payload).await?;
    }
    writer.flush().await?;

    tracing::debug!(
        msg_type = ?msg_type,
        sequence,
        payload_len = payload.len(),
        "sent message"
    );
    Ok(())
}

/// Receive one protocol message.
///
/// # Errors
///
/// Fails on malformed headers, header CRC mismatch, a declared payload
/// larger than `max_payload`, or a stream error.
pub async fn recv_message<R>(reader: &mut R, max_payload: usize) -> Result<(MessageHeader, Vec<u8>)>
where
    R: AsyncRead + Unpin,
{
    let header = read_header(reader).await?;

    if header.payload_size > max_payload as u64 {
        return Err(Error::PayloadTooLarge {
            size: header.payload_size,
            max: max_payload as u64,
        });
    }

    #[allow(clippy::cast_possible_truncation)]
    let mut payload = vec![0u8; header.payload_size as usize];
    if !payload.is_empty() {
        read_full(reader, &mut payload).await?;
    }

    tracing::debug!(
        msg_type = ?header.msg_type,
        sequence = header.sequence,
        payload_len = payload.len(),
        "received message"
    );
    Ok((header, payload))
}

/// Send one file chunk as a `CHUNK_DATA` message.
///
/// The payload is `ChunkHeader || data`; the chunk CRC is computed here.
/// Header, chunk header, and data go out as three writes on the same
/// buffered stream, flushed together.
///
/// # Errors
///
/// Returns an error if the stream write fails.
pub async fn send_chunk<W>(
    writer: &mut W,
    chunk_id: u64,
    chunk_offset: u64,
    data: &[u8],
    sequence: u64,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    #[allow(clippy::cast_possible_truncation)]
    let chunk_header = ChunkHeader {
        chunk_id,
        chunk_offset,
        chunk_size: data.len() as u32,
        chunk_crc32: crc32(data),
    };

    let header = MessageHeader::new(
        MessageType::ChunkData,
        sequence,
        (CHUNK_HEADER_SIZE + data.len()) as u64,
    );

    writer.write_all(&header.encode()).await?;
    writer.write_all(&chunk_header.encode()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;

    tracing::debug!(
        chunk_id,
        chunk_offset,
        len = data.len(),
        "sent chunk, crc {:#010x}",
        chunk_header.chunk_crc32
    );
    Ok(())
}

/// Receive one `CHUNK_DATA` message and verify its CRC.
///
/// # Errors
///
/// A CRC mismatch returns [`Error::ChunkChecksum`] with the chunk id
/// populated so the caller can answer with a retry ack. Any other fault
/// (wrong message type, size inconsistencies, stream errors) is terminal
/// for the transfer.
pub async fn recv_chunk<R>(reader: &mut R, max_chunk_size: u32) -> Result<(ChunkHeader, Vec<u8>)>
where
    R: AsyncRead + Unpin,
{
    let header = read_header(reader).await?;

    if header.msg_type != MessageType::ChunkData {
        return Err(Error::UnexpectedMessage {
            expected: "ChunkData".to_string(),
            actual: format!("{:?}", header.msg_type),
        });
    }

    let mut hdr_buf = [0u8; CHUNK_HEADER_SIZE];
    read_full(reader, &mut hdr_buf).await?;
    let chunk_header = ChunkHeader::decode(&hdr_buf)?;

    if chunk_header.chunk_size > max_chunk_size {
        return Err(Error::PayloadTooLarge {
            size: u64::from(chunk_header.chunk_size),
            max: u64::from(max_chunk_size),
        });
    }
    if header.payload_size != (CHUNK_HEADER_SIZE as u64) + u64::from(chunk_header.chunk_size) {
        return Err(Error::Protocol(format!(
            "chunk payload size mismatch: header says {}, chunk says {}",
            header.payload_size, chunk_header.chunk_size
        )));
    }

    let mut data = vec![0u8; chunk_header.chunk_size as usize];
    read_full(reader, &mut data).await?;

    let computed = crc32(&data);
    if computed != chunk_header.chunk_crc32 {
        return Err(Error::ChunkChecksum {
            chunk_id: chunk_header.chunk_id,
            expected: chunk_header.chunk_crc32,
            computed,
        });
    }

    tracing::debug!(
        chunk_id = chunk_header.chunk_id,
        len = data.len(),
        "received chunk"
    );
    Ok((chunk_header, data))
}

/// Send a `MSG_ERROR` with the given wire code and description.
///
/// # Errors
///
/// Returns an error if the stream write fails.
pub async fn send_error<W>(
    writer: &mut W,
    code: i8,
    chunk_id: u64,
    message: &str,
    sequence: u64,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let payload = ErrorMessage::new(code, chunk_id, message).encode();
    send_message(writer, MessageType::Error, sequence, &payload).await
}
