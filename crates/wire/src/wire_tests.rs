// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire format tests: length-prefix framing and JSON encoding.

use super::*;
use crate::Response;

#[test]
fn encode_returns_json_without_length_prefix() {
    let response = Response::Ok;
    let encoded = encode(&response).expect("encode failed");

    let json_str = std::str::from_utf8(&encoded).expect("should be valid UTF-8");
    assert!(json_str.starts_with('{'), "should be JSON object: {json_str}");
}

#[tokio::test]
async fn read_write_message_roundtrip() {
    let original = b"hello world";

    let mut buffer = Vec::new();
    write_message(&mut buffer, original).await.expect("write failed");

    assert_eq!(buffer.len(), 4 + original.len());

    let mut cursor = std::io::Cursor::new(buffer);
    let read_back = read_message(&mut cursor).await.expect("read failed");

    assert_eq!(read_back, original);
}

#[tokio::test]
async fn write_message_adds_length_prefix() {
    let data = b"test data";

    let mut buffer = Vec::new();
    write_message(&mut buffer, data).await.expect("write failed");

    let len = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as usize;

    assert_eq!(len, data.len());
    assert_eq!(&buffer[4..], data);
}

#[tokio::test]
async fn read_message_rejects_frame_over_the_size_limit() {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&(MAX_FRAME_BYTES + 1).to_be_bytes());

    let mut cursor = std::io::Cursor::new(buffer);
    let err = read_message(&mut cursor).await.expect_err("oversized frame must be rejected");
    assert!(matches!(err, ProtocolError::TooLarge(_, _)));
}

#[tokio::test]
async fn read_request_decodes_a_framed_request() {
    let request = Request::Ping;
    let payload = encode(&request).expect("encode");

    let mut buffer = Vec::new();
    write_message(&mut buffer, &payload).await.expect("write");

    let mut cursor = std::io::Cursor::new(buffer);
    let decoded = read_request(&mut cursor).await.expect("read_request");
    assert!(matches!(decoded, Request::Ping));
}

#[tokio::test]
async fn write_response_frames_an_envelope() {
    let envelope = Envelope::ok(Response::Pong);

    let mut buffer = Vec::new();
    write_response(&mut buffer, &envelope).await.expect("write_response");

    let mut cursor = std::io::Cursor::new(buffer);
    let payload = read_message(&mut cursor).await.expect("read_message");
    let decoded: Envelope = decode(&payload).expect("decode");
    assert!(decoded.ok);
}
