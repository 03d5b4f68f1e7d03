// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol for daemon communication.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod handler;
mod request;
mod response;
mod wire;

pub use handler::dispatch;
pub use request::{Request, StatsInclude};
pub use response::{Envelope, ErrorBody, Response};
pub use wire::{decode, encode, read_message, read_request, write_message, write_response, ProtocolError};
