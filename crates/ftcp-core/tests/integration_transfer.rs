//! Integration tests for FTCP file transfers.
//!
//! These tests run both roles over loopback TCP and verify end-to-end
//! behavior: empty files, exact-multiple and non-multiple chunking,
//! in-flight corruption with retransmit, retry exhaustion, and hostile
//! filenames. Corruption is injected by a frame-aware proxy sitting
//! between the two roles.

mod common;

use std::path::PathBuf;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use ftcp_core::error::Error;
use ftcp_core::protocol::exchange;
use ftcp_core::protocol::{
    ErrorMessage, FileInfo, HandshakePayload, MessageType, ERROR_MESSAGE_SIZE, HANDSHAKE_SIZE,
};
use ftcp_core::transfer::{ReceiveSession, SendSession, TransferConfig};

use common::{assert_files_equal, create_temp_dir, create_test_file, random_bytes, visible_entries};

/// Small chunks keep the tests fast while still exercising multi-chunk
/// transfers.
const TEST_CHUNK_SIZE: u32 = 8192;

fn test_config() -> TransferConfig {
    TransferConfig {
        chunk_size: TEST_CHUNK_SIZE,
        timeout_secs: 10,
        connect_attempts: 1,
        ..TransferConfig::default()
    }
}

/// Run one full transfer of `content` over loopback and return the
/// receiver's output path.
async fn transfer_roundtrip(content: &[u8]) -> (tempfile::TempDir, PathBuf, PathBuf) {
    let temp_dir = create_temp_dir();
    let source = create_test_file(temp_dir.path(), "payload.bin", content);
    let output_dir = temp_dir.path().join("output");

    let config = test_config();
    let mut receiver = ReceiveSession::bind(0, output_dir, config.clone())
        .await
        .expect("bind receiver");
    let port = receiver.port().expect("receiver port");
    let receive_handle = tokio::spawn(async move { receiver.run().await });

    let mut sender = SendSession::new("127.0.0.1".to_string(), port, source.clone(), config);
    let summary = sender.run().await.expect("send");

    let (path, recv_summary) = receive_handle
        .await
        .expect("receiver task panicked")
        .expect("receive");

    assert_eq!(summary.bytes, content.len() as u64);
    assert_eq!(recv_summary.bytes, content.len() as u64);

    (temp_dir, source, path)
}

#[tokio::test]
async fn empty_file_transfer() {
    let (_guard, _source, path) = transfer_roundtrip(b"").await;
    assert!(path.exists());
    assert_eq!(std::fs::read(&path).expect("read"), b"");
}

#[tokio::test]
async fn exact_multiple_of_chunk_size() {
    let content = random_bytes(2 * TEST_CHUNK_SIZE as usize);
    let (_guard, source, path) = transfer_roundtrip(&content).await;
    assert_files_equal(&source, &path);
}

#[tokio::test]
async fn non_multiple_of_chunk_size() {
    // Two chunks: one full, one short.
    let content = random_bytes(TEST_CHUNK_SIZE as usize + 3000);
    let (_guard, source, path) = transfer_roundtrip(&content).await;
    assert_files_equal(&source, &path);
}

#[tokio::test]
async fn single_byte_file() {
    let (_guard, source, path) = transfer_roundtrip(b"x").await;
    assert_files_equal(&source, &path);
}

#[tokio::test]
async fn chunk_count_matches_ceiling_division() {
    let content = random_bytes(3 * TEST_CHUNK_SIZE as usize + 1);
    let temp_dir = create_temp_dir();
    let source = create_test_file(temp_dir.path(), "payload.bin", &content);
    let output_dir = temp_dir.path().join("output");

    let config = test_config();
    let mut receiver = ReceiveSession::bind(0, output_dir, config.clone())
        .await
        .expect("bind receiver");
    let port = receiver.port().expect("receiver port");
    let receive_handle = tokio::spawn(async move { receiver.run().await });

    let mut sender = SendSession::new("127.0.0.1".to_string(), port, source, config);
    let summary = sender.run().await.expect("send");
    assert_eq!(summary.chunks, 4);

    receive_handle
        .await
        .expect("receiver task panicked")
        .expect("receive");
}

/// A frame-aware proxy that flips a byte inside the data of the targeted
/// chunk on its way to the receiver. `always` controls whether every
/// retransmission is corrupted too.
async fn corrupting_proxy(listener: TcpListener, target_port: u16, chunk_id: u64, always: bool) {
    let (client, _) = listener.accept().await.expect("proxy accept");
    let server = TcpStream::connect(("127.0.0.1", target_port))
        .await
        .expect("proxy dial");

    let (mut client_read, mut client_write) = client.into_split();
    let (mut server_read, mut server_write) = server.into_split();

    // Receiver-to-sender traffic (acks) passes through untouched.
    let downstream = tokio::spawn(async move {
        let _ = tokio::io::copy(&mut server_read, &mut client_write).await;
    });

    let mut corrupted = false;
    loop {
        let mut header = [0u8; 32];
        if client_read.read_exact(&mut header).await.is_err() {
            break;
        }
        let payload_size =
            u64::from_be_bytes(header[16..24].try_into().expect("8-byte slice")) as usize;
        let mut payload = vec![0u8; payload_size];
        if client_read.read_exact(&mut payload).await.is_err() {
            break;
        }

        // CHUNK_DATA payloads start with the 24-byte chunk header; flip the
        // first data byte of the targeted chunk.
        if header[5] == 0x05 && payload_size > 24 {
            let id = u64::from_be_bytes(payload[0..8].try_into().expect("8-byte slice"));
            if id == chunk_id && (always || !corrupted) {
                payload[24] ^= 0xFF;
                corrupted = true;
            }
        }

        if server_write.write_all(&header).await.is_err() {
            break;
        }
        if server_write.write_all(&payload).await.is_err() {
            break;
        }
    }

    drop(server_write);
    let _ = downstream.await;
}

#[tokio::test]
async fn corrupted_chunk_is_retransmitted() {
    let content = random_bytes(6 * TEST_CHUNK_SIZE as usize);
    let temp_dir = create_temp_dir();
    let source = create_test_file(temp_dir.path(), "payload.bin", &content);
    let output_dir = temp_dir.path().join("output");

    let config = test_config();
    let mut receiver = ReceiveSession::bind(0, output_dir, config.clone())
        .await
        .expect("bind receiver");
    let receiver_port = receiver.port().expect("receiver port");
    let receive_handle = tokio::spawn(async move { receiver.run().await });

    let proxy_listener = TcpListener::bind("127.0.0.1:0").await.expect("proxy bind");
    let proxy_port = proxy_listener.local_addr().expect("proxy addr").port();
    let proxy = tokio::spawn(corrupting_proxy(proxy_listener, receiver_port, 3, false));

    let mut sender = SendSession::new("127.0.0.1".to_string(), proxy_port, source.clone(), config);
    sender.run().await.expect("send should survive one corruption");

    let (path, _) = receive_handle
        .await
        .expect("receiver task panicked")
        .expect("receive");
    assert_files_equal(&source, &path);

    proxy.await.expect("proxy task panicked");
}

#[tokio::test]
async fn persistent_corruption_exhausts_retries() {
    let content = random_bytes(6 * TEST_CHUNK_SIZE as usize);
    let temp_dir = create_temp_dir();
    let source = create_test_file(temp_dir.path(), "payload.bin", &content);
    let output_dir = temp_dir.path().join("output");

    let config = test_config();
    let mut receiver = ReceiveSession::bind(0, output_dir.clone(), config.clone())
        .await
        .expect("bind receiver");
    let receiver_port = receiver.port().expect("receiver port");
    let receive_handle = tokio::spawn(async move { receiver.run().await });

    let proxy_listener = TcpListener::bind("127.0.0.1:0").await.expect("proxy bind");
    let proxy_port = proxy_listener.local_addr().expect("proxy addr").port();
    let proxy = tokio::spawn(corrupting_proxy(proxy_listener, receiver_port, 3, true));

    let mut sender = SendSession::new("127.0.0.1".to_string(), proxy_port, source, config);
    let err = sender.run().await.expect_err("sender must give up");
    match err {
        Error::RetriesExhausted { chunk_id, attempts } => {
            assert_eq!(chunk_id, 3);
            assert_eq!(attempts, 3);
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }

    // The receiver fails once the sender hangs up; nothing may be published
    // and the temp sink must be gone.
    let receiver_result = receive_handle.await.expect("receiver task panicked");
    assert!(receiver_result.is_err());
    assert!(!output_dir.join("payload.bin").exists());
    assert!(!output_dir.join(".payload.bin.tmp").exists());

    proxy.await.expect("proxy task panicked");
}

#[tokio::test]
async fn traversal_filename_is_rejected_before_any_file_exists() {
    let temp_dir = create_temp_dir();
    let output_dir = temp_dir.path().join("output");

    let config = test_config();
    let mut receiver = ReceiveSession::bind(0, output_dir.clone(), config.clone())
        .await
        .expect("bind receiver");
    let port = receiver.port().expect("receiver port");
    let receive_handle = tokio::spawn(async move { receiver.run().await });

    // Hand-rolled hostile client announcing a traversal filename.
    let mut stream = TcpStream::connect(("127.0.0.1", port)).await.expect("dial");

    exchange::send_message(
        &mut stream,
        MessageType::HandshakeReq,
        0,
        &HandshakePayload::current().encode(),
    )
    .await
    .expect("send handshake");
    let (ack_header, _) = exchange::recv_message(&mut stream, HANDSHAKE_SIZE)
        .await
        .expect("handshake ack");
    assert_eq!(ack_header.msg_type, MessageType::HandshakeAck);
    assert_eq!(ack_header.sequence, 1);

    let info = FileInfo {
        filename: "../etc/passwd".to_string(),
        file_size: 4,
        total_chunks: 1,
        chunk_size: TEST_CHUNK_SIZE,
        checksum_type: 0,
        file_checksum: [0u8; 32],
        file_mode: 0o644,
        timestamp: 0,
    };
    exchange::send_message(&mut stream, MessageType::FileInfo, 2, &info.encode())
        .await
        .expect("send file info");

    let (header, payload) = exchange::recv_message(&mut stream, ERROR_MESSAGE_SIZE)
        .await
        .expect("error reply");
    assert_eq!(header.msg_type, MessageType::Error);
    let msg = ErrorMessage::decode(&payload).expect("decode error");
    assert_eq!(msg.code, -31);

    let receiver_result = receive_handle.await.expect("receiver task panicked");
    assert!(matches!(receiver_result, Err(Error::InvalidFilename(_))));
    assert!(visible_entries(&output_dir).is_empty());
}

#[tokio::test]
async fn received_file_appears_only_after_completion() {
    // A slow but eventually successful transfer; the destination name must
    // not exist while chunks are still in flight.
    let content = random_bytes(4 * TEST_CHUNK_SIZE as usize);
    let temp_dir = create_temp_dir();
    let source = create_test_file(temp_dir.path(), "payload.bin", &content);
    let output_dir = temp_dir.path().join("output");

    let config = test_config();
    let mut receiver = ReceiveSession::bind(0, output_dir.clone(), config.clone())
        .await
        .expect("bind receiver");
    let port = receiver.port().expect("receiver port");
    let mut progress = receiver.progress();
    let receive_handle = tokio::spawn(async move { receiver.run().await });

    let final_path = output_dir.join("payload.bin");
    let watcher_path = final_path.clone();
    let watcher = tokio::spawn(async move {
        use ftcp_core::transfer::TransferState;
        while progress.changed().await.is_ok() {
            let state = progress.borrow().state;
            if state == TransferState::Transferring {
                assert!(
                    !watcher_path.exists(),
                    "destination existed before finalize"
                );
            }
            if matches!(state, TransferState::Completed | TransferState::Failed) {
                break;
            }
        }
    });

    let mut sender = SendSession::new("127.0.0.1".to_string(), port, source.clone(), config);
    sender.run().await.expect("send");

    let (path, _) = receive_handle
        .await
        .expect("receiver task panicked")
        .expect("receive");
    watcher.await.expect("watcher task panicked");

    assert_eq!(path, final_path);
    assert_files_equal(&source, &path);
}
