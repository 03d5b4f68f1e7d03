// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Unix-domain-socket listener (§6): accepts a connection, reads one
//! framed request, dispatches it onto the Store, writes one framed
//! response, and closes. A CLI or test harness drives the daemon without a
//! browser by speaking this same protocol.

use hub_core::Clock;
use hub_engine::Store;
use hub_wire::ProtocolError;
use std::sync::Arc;
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;

/// Accept loop: spawns one task per connection so a slow client never
/// blocks the next accept.
pub async fn run<C: Clock + 'static>(
    listener: UnixListener,
    store: Arc<Store<C>>,
    tz_offset_minutes: i32,
    locale: String,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _)) => {
                        let store = Arc::clone(&store);
                        let locale = locale.clone();
                        tokio::spawn(async move {
                            if let Err(err) = handle_connection(stream, &store, tz_offset_minutes, &locale).await {
                                log_connection_error(err);
                            }
                        });
                    }
                    Err(err) => tracing::error!(error = %err, "unix accept failed"),
                }
            }
            _ = shutdown.cancelled() => {
                tracing::info!("listener shutting down");
                break;
            }
        }
    }
}

async fn handle_connection<C: Clock>(
    stream: UnixStream,
    store: &Store<C>,
    tz_offset_minutes: i32,
    locale: &str,
) -> Result<(), ProtocolError> {
    let (mut reader, mut writer) = stream.into_split();
    let request = hub_wire::read_request(&mut reader).await?;
    tracing::debug!(request = ?request, "received request");
    let envelope = hub_wire::dispatch(store, tz_offset_minutes, locale, request).await;
    hub_wire::write_response(&mut writer, &envelope).await?;
    Ok(())
}

fn log_connection_error(err: ProtocolError) {
    match err {
        ProtocolError::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::UnexpectedEof => {
            tracing::debug!("client disconnected before sending a request");
        }
        other => tracing::warn!(error = %other, "connection error"),
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
