// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use hub_wire::{ErrorBody, Response};
use tempfile::tempdir;
use tokio::net::UnixListener;

async fn serve_once(listener: UnixListener, envelope: Envelope) {
    let (stream, _) = listener.accept().await.expect("accept");
    let (mut reader, mut writer) = stream.into_split();
    let _ = hub_wire::read_message(&mut reader).await.expect("read request");
    let payload = hub_wire::encode(&envelope).expect("encode envelope");
    hub_wire::write_message(&mut writer, &payload).await.expect("write response");
}

#[tokio::test]
async fn send_returns_data_on_ok_envelope() {
    let dir = tempdir().expect("tempdir");
    let socket_path = dir.path().join("hub.sock");
    let listener = UnixListener::bind(&socket_path).expect("bind");
    let server = tokio::spawn(serve_once(listener, Envelope::ok(Response::Pong)));

    let client = DaemonClient::new(&socket_path);
    let response = client.send(&Request::Ping).await.expect("send succeeds");
    assert!(matches!(response, Response::Pong));

    server.await.expect("server task");
}

#[tokio::test]
async fn send_surfaces_daemon_errors() {
    let dir = tempdir().expect("tempdir");
    let socket_path = dir.path().join("hub.sock");
    let listener = UnixListener::bind(&socket_path).expect("bind");
    let error = ErrorBody { code: "NOT_FOUND".to_string(), message: "no such message".to_string() };
    let server = tokio::spawn(serve_once(listener, Envelope::err(error)));

    let client = DaemonClient::new(&socket_path);
    let result = client.send(&Request::MessageAck { r#ref: "m-1".to_string() }).await;
    match result {
        Err(ClientError::Daemon(body)) => assert_eq!(body.code, "NOT_FOUND"),
        other => panic!("expected ClientError::Daemon, got {other:?}"),
    }

    server.await.expect("server task");
}

#[tokio::test]
async fn connect_failure_is_reported_with_the_socket_path() {
    let dir = tempdir().expect("tempdir");
    let socket_path = dir.path().join("missing.sock");
    let client = DaemonClient::new(&socket_path);

    let result = client.send(&Request::Ping).await;
    assert!(matches!(result, Err(ClientError::Connect { .. })));
}

#[test]
fn resolve_socket_path_prefers_the_explicit_override() {
    let explicit = PathBuf::from("/tmp/explicit.sock");
    assert_eq!(resolve_socket_path(Some(&explicit)), explicit);
}
