// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The engine-boundary error taxonomy (§7).
//!
//! `Storage`/`Archive` I/O failures are intentionally absent here — they're
//! logged and retried at their own layer and never escape to a mutation
//! caller (per §4.2/§4.3); only error kinds that a caller can act on are
//! represented.

use crate::factory::ValidationError;
use crate::refid::MsgRef;

#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("no message with ref {0:?}")]
    NotFound(MsgRef),

    #[error("a non-quasi-deleted message with ref {0:?} already exists")]
    Conflict(MsgRef),

    #[error("query type error: {0}")]
    TypeError(String),

    #[error("store is not ready")]
    NotReady,

    #[error("plugin {plugin} failed: {source}")]
    Plugin { plugin: String, #[source] source: Box<dyn std::error::Error + Send + Sync> },
}

impl HubError {
    /// The wire-level `{code, message}` translation applied at the
    /// command-bus boundary (§6, §7).
    pub fn code(&self) -> &'static str {
        match self {
            HubError::Validation(_) => "BAD_REQUEST",
            HubError::NotFound(_) => "NOT_FOUND",
            HubError::Conflict(_) => "CONFLICT",
            HubError::TypeError(_) => "BAD_REQUEST",
            HubError::NotReady => "NOT_READY",
            HubError::Plugin { .. } => "INTERNAL",
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
