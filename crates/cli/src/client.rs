// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin client for the daemon's Unix-domain-socket command bus (§6): connect,
//! send one framed [`Request`], read back the [`Envelope`], done.

use hub_wire::{Envelope, ErrorBody, ProtocolError, Request, Response};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::net::UnixStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connecting to daemon at {path}: {source}")]
    Connect { path: PathBuf, source: std::io::Error },
    #[error("talking to daemon: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("daemon returned an error: {0}")]
    Daemon(ErrorBody),
    #[error("unexpected response from daemon: {0:?}")]
    UnexpectedResponse(Response),
}

pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self { socket_path: socket_path.into() }
    }

    async fn connect(&self) -> Result<UnixStream, ClientError> {
        UnixStream::connect(&self.socket_path)
            .await
            .map_err(|source| ClientError::Connect { path: self.socket_path.clone(), source })
    }

    /// Send `request` and return its `data`, or [`ClientError::Daemon`] if
    /// the daemon replied `ok: false`.
    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let mut stream = self.connect().await?;
        let payload = hub_wire::encode(request)?;
        hub_wire::write_message(&mut stream, &payload).await?;
        let response_bytes = hub_wire::read_message(&mut stream).await?;
        let envelope: Envelope = hub_wire::decode(&response_bytes)?;
        match envelope {
            Envelope { ok: true, data: Some(data), .. } => Ok(data),
            Envelope { ok: true, data: None, .. } => Ok(Response::Ok),
            Envelope { error: Some(error), .. } => Err(ClientError::Daemon(error)),
            envelope => Err(ClientError::Daemon(ErrorBody {
                code: "INTERNAL".to_string(),
                message: format!("malformed envelope: {envelope:?}"),
            })),
        }
    }

    /// Send `request`, expecting a bare [`Response::Ok`].
    pub async fn send_simple(&self, request: &Request) -> Result<(), ClientError> {
        match self.send(request).await? {
            Response::Ok => Ok(()),
            other => Err(ClientError::UnexpectedResponse(other)),
        }
    }
}

pub fn default_socket_path() -> PathBuf {
    if let Ok(path) = std::env::var("HUB_DAEMON_SOCKET_PATH") {
        return PathBuf::from(path);
    }
    default_state_dir().join("hub.sock")
}

fn default_state_dir() -> PathBuf {
    dirs::state_dir().or_else(dirs::data_local_dir).unwrap_or_else(|| PathBuf::from(".")).join("hub")
}

pub fn resolve_socket_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map(Path::to_path_buf).unwrap_or_else(default_socket_path)
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
