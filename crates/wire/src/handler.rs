// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatches a decoded [`Request`] onto a [`Store`] and produces the
//! wire-level [`Envelope`] (§6/§7). This is the only place `HubError` is
//! translated into `{code, message}`.

use hub_core::{Clock, Constants, HubError, LifecycleState, MsgRef, Patch};
use hub_engine::{compute_stats, query_messages, IoStats, Store};

use crate::{Envelope, Request, Response};

/// `tz_offset_minutes` is the operator's configured timezone offset, used
/// only by `admin.stats.get`'s calendar buckets. `locale` is the operator's
/// configured display locale, used only by `messages.query`'s rendering
/// pass (§4.4).
pub async fn dispatch<C: Clock>(store: &Store<C>, tz_offset_minutes: i32, locale: &str, request: Request) -> Envelope {
    Envelope::from_result(handle(store, tz_offset_minutes, locale, request).await)
}

async fn handle<C: Clock>(
    store: &Store<C>,
    tz_offset_minutes: i32,
    locale: &str,
    request: Request,
) -> Result<Response, HubError> {
    match request {
        Request::Ping => Ok(Response::Pong),

        Request::ConstantsGet => Ok(Response::Constants(Constants::default())),

        Request::StatsGet { include } => {
            let snapshot = store.snapshot().await;
            let io = if include.archive_size {
                let (storage_bytes, archive_bytes) = store.io_stats();
                IoStats { storage_bytes: Some(storage_bytes), archive_bytes: Some(archive_bytes) }
            } else {
                IoStats::default()
            };
            let summary = compute_stats(&snapshot, store.epoch_ms(), tz_offset_minutes, io);
            Ok(Response::Stats(Box::new(summary)))
        }

        Request::MessagesQuery { spec } => {
            let snapshot = store.snapshot().await;
            let now_ms = store.epoch_ms();
            Ok(Response::MessagesQuery(query_messages(&snapshot, &spec, now_ms, locale)))
        }

        Request::MessagesDelete { refs } => {
            let mut removed = Vec::with_capacity(refs.len());
            for r#ref in &refs {
                let msg_ref = MsgRef::new(r#ref);
                if store.remove_message(&msg_ref).await.is_ok() {
                    removed.push(r#ref.clone());
                }
            }
            Ok(Response::MessagesDeleted { refs: removed })
        }

        Request::MessageAck { r#ref } => {
            let msg_ref = MsgRef::new(&r#ref);
            let mut patch = Patch::default();
            patch.lifecycle_state = Some(Some(LifecycleState::Acked));
            let msg = store.update_message(&msg_ref, patch, false).await?;
            Ok(Response::Message(Box::new(msg)))
        }

        Request::MessageClose { r#ref } => {
            let msg_ref = MsgRef::new(&r#ref);
            let mut patch = Patch::default();
            patch.lifecycle_state = Some(Some(LifecycleState::Closed));
            let msg = store.update_message(&msg_ref, patch, false).await?;
            Ok(Response::Message(Box::new(msg)))
        }

        Request::MessageDelete { r#ref } => {
            let msg_ref = MsgRef::new(&r#ref);
            let msg = store.remove_message(&msg_ref).await?;
            Ok(Response::Message(Box::new(msg)))
        }

        Request::MessageSnooze { r#ref, until } => {
            let msg_ref = MsgRef::new(&r#ref);
            let mut patch = Patch::default();
            patch.lifecycle_state = Some(Some(LifecycleState::Snoozed));
            patch.timing.notify_at = Some(Some(until));
            let msg = store.update_message(&msg_ref, patch, false).await?;
            Ok(Response::Message(Box::new(msg)))
        }
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
