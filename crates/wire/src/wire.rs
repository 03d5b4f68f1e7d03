// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire framing for the Unix-domain-socket command bus: a 4-byte big-endian
//! length prefix followed by a JSON payload.

use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{Envelope, Request};

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message of {0} bytes exceeds the {1}-byte frame limit")]
    TooLarge(u32, u32),
}

/// Refuses to allocate more than this for a single frame, however many
/// bytes a length prefix claims — guards against a corrupt or hostile peer.
const MAX_FRAME_BYTES: u32 = 64 * 1024 * 1024;

/// Serialize a value to raw JSON bytes (no length prefix).
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(value)?)
}

/// Deserialize raw JSON bytes (no length prefix) into a value.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Write a 4-byte big-endian length prefix followed by `payload`.
pub async fn write_message<W: AsyncWrite + Unpin>(writer: &mut W, payload: &[u8]) -> Result<(), ProtocolError> {
    let len = u32::try_from(payload.len()).map_err(|_| ProtocolError::TooLarge(u32::MAX, MAX_FRAME_BYTES))?;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read a length-prefixed frame and return its raw payload bytes.
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes).await?;
    let len = u32::from_be_bytes(len_bytes);
    if len > MAX_FRAME_BYTES {
        return Err(ProtocolError::TooLarge(len, MAX_FRAME_BYTES));
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}

/// Read and decode a framed [`Request`] from the socket.
pub async fn read_request<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Request, ProtocolError> {
    let payload = read_message(reader).await?;
    decode(&payload)
}

/// Encode and write a framed [`Envelope`] to the socket.
pub async fn write_response<W: AsyncWrite + Unpin>(writer: &mut W, envelope: &Envelope) -> Result<(), ProtocolError> {
    let payload = encode(envelope)?;
    write_message(writer, &payload).await
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
