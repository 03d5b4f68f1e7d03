// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-bus requests (§6): `admin.*` read/aggregate commands and the
//! control-plane actions (`ack`/`close`/`delete`/`snooze`) that each map to
//! an `update_message` patch.

use hub_engine::QuerySpec;
use serde::{Deserialize, Serialize};

/// `admin.stats.get { include? }`. `archive_size_max_age_ms` is accepted for
/// wire compatibility but not yet used to bound the archive walk — the
/// archive directory is walked in full whenever `archive_size` is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsInclude {
    #[serde(default)]
    pub archive_size: bool,
    #[serde(default)]
    pub archive_size_max_age_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Liveness check; answered with [`crate::Response::Pong`].
    Ping,

    /// `admin.constants.get`.
    ConstantsGet,

    /// `admin.stats.get`.
    StatsGet {
        #[serde(default)]
        include: StatsInclude,
    },

    /// `admin.messages.query`.
    MessagesQuery {
        #[serde(flatten)]
        spec: QuerySpec,
    },

    /// `admin.messages.delete`.
    MessagesDelete { refs: Vec<String> },

    /// Control-plane `ack`: acknowledges an open message in place.
    MessageAck { r#ref: String },

    /// Control-plane `close`: transitions a message to `closed`.
    MessageClose { r#ref: String },

    /// Control-plane `delete`: soft-deletes a single message.
    MessageDelete { r#ref: String },

    /// Control-plane `snooze`: pushes `notifyAt` out to `until`.
    MessageSnooze { r#ref: String, until: u64 },
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
