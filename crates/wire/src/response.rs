// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-bus responses and the `{ok, data}` / `{ok: false, error}`
//! envelope (§6).

use hub_core::{Constants, HubError, Message};
use hub_engine::{QueryResult, StatsSummary};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success, for commands with nothing else to report (e.g. `Ping`).
    Ok,
    Pong,
    Constants(Constants),
    Stats(Box<StatsSummary>),
    MessagesQuery(QueryResult),
    MessagesDeleted { refs: Vec<String> },
    Message(Box<Message>),
}

/// `{code, message}` (§7) — `code` is [`HubError::code`]'s wire form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl From<&HubError> for ErrorBody {
    fn from(err: &HubError) -> Self {
        ErrorBody { code: err.code().to_string(), message: err.to_string() }
    }
}

/// The wire envelope every command-bus reply is wrapped in (§6). `Ok`
/// carries `data`, `Err` carries `error`; exactly one is ever present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Response>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Envelope {
    pub fn ok(data: Response) -> Self {
        Envelope { ok: true, data: Some(data), error: None }
    }

    pub fn err(error: ErrorBody) -> Self {
        Envelope { ok: false, data: None, error: Some(error) }
    }

    pub fn from_result(result: Result<Response, HubError>) -> Self {
        match result {
            Ok(data) => Envelope::ok(data),
            Err(err) => Envelope::err(ErrorBody::from(&err)),
        }
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
