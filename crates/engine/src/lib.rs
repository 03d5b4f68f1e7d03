// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hub-engine: the Store (§4.7), the lifecycle scheduler ticks (§4.8), the
//! Renderer (§4.4), and the query engine (§4.9) — everything that sits
//! between the canonical message table and the command bus.

pub mod query;
pub mod render;
pub mod stats;
pub mod store;

pub use query::{query_messages, QuerySpec, QueryResult, SortDir, SortField, SortSpec, Where};
pub use render::{render, render_all, Display, RenderedMessage};
pub use stats::{compute_stats, CurrentStats, DoneStats, IoStats, MetaStats, ScheduleStats, StatsSummary};
pub use store::{minute_of_day, Store};
