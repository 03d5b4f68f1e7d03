// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `admin.stats.get` aggregates (§6): a pure function over a Store snapshot,
//! the same shape as the query engine — the command-bus handler supplies
//! `now`/`tz_offset_minutes`, this module only does arithmetic.

use chrono::{Datelike, Duration as ChronoDuration, TimeZone, Utc};
use hub_core::{Kind, LifecycleState, Message};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentStats {
    pub total: usize,
    pub by_kind: HashMap<Kind, usize>,
    pub by_lifecycle: HashMap<LifecycleState, usize>,
    pub by_origin_system: HashMap<String, usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleStats {
    pub total: usize,
    pub overdue: usize,
    pub today: usize,
    pub tomorrow: usize,
    pub next7_days: usize,
    pub this_week: usize,
    pub this_month: usize,
    pub by_kind: HashMap<Kind, usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoneStats {
    pub today: usize,
    pub this_week: usize,
    pub this_month: usize,
    pub last_closed_at: Option<u64>,
}

/// Only populated when `StatsInclude::archive_size` is requested — walking
/// the archive tree is the one part of this computation that isn't free.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IoStats {
    pub storage_bytes: Option<u64>,
    pub archive_bytes: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaStats {
    pub generated_at: u64,
    pub tz_offset_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSummary {
    pub current: CurrentStats,
    pub schedule: ScheduleStats,
    pub done: DoneStats,
    pub io: IoStats,
    pub meta: MetaStats,
}

/// Midnight at the start of the local calendar day `days_ahead` from `now`,
/// expressed back in epoch-ms (UTC).
#[allow(clippy::expect_used)]
fn local_midnight(now_ms: u64, tz_offset_minutes: i32, days_ahead: i64) -> i64 {
    let offset = ChronoDuration::minutes(tz_offset_minutes as i64);
    let local_now = Utc.timestamp_millis_opt(now_ms as i64).single().unwrap_or_else(Utc::now) + offset;
    let start_of_today = local_now.date_naive().and_hms_opt(0, 0, 0).expect("midnight is always valid");
    ((start_of_today + ChronoDuration::days(days_ahead)) - offset).and_utc().timestamp_millis()
}

/// Start of the local ISO week (Monday) containing `now`, in epoch-ms.
fn local_week_start(now_ms: u64, tz_offset_minutes: i32) -> i64 {
    let offset = ChronoDuration::minutes(tz_offset_minutes as i64);
    let local_now = Utc.timestamp_millis_opt(now_ms as i64).single().unwrap_or_else(Utc::now) + offset;
    let weekday = local_now.date_naive().weekday().num_days_from_monday() as i64;
    local_midnight(now_ms, tz_offset_minutes, -weekday)
}

/// Start of the local calendar month containing `now`, in epoch-ms.
#[allow(clippy::expect_used)]
fn local_month_bounds(now_ms: u64, tz_offset_minutes: i32) -> (i64, i64) {
    let offset = ChronoDuration::minutes(tz_offset_minutes as i64);
    let local_now = Utc.timestamp_millis_opt(now_ms as i64).single().unwrap_or_else(Utc::now) + offset;
    let first_of_month =
        local_now.date_naive().with_day(1).expect("day 1 always valid").and_hms_opt(0, 0, 0).expect("midnight is valid");
    let first_of_next_month = (first_of_month + ChronoDuration::days(32))
        .with_day(1)
        .expect("day 1 always valid")
        .and_hms_opt(0, 0, 0)
        .expect("midnight is valid");
    ((first_of_month - offset).and_utc().timestamp_millis(), (first_of_next_month - offset).and_utc().timestamp_millis())
}

/// `admin.stats.get` (§6). `tz_offset_minutes` is the operator's configured
/// timezone offset, since "today"/"this week" are local-calendar concepts.
pub fn compute_stats(messages: &[Message], now_ms: u64, tz_offset_minutes: i32, io: IoStats) -> StatsSummary {
    let mut current = CurrentStats::default();
    let mut schedule = ScheduleStats::default();
    let mut done = DoneStats::default();

    let today_start = local_midnight(now_ms, tz_offset_minutes, 0);
    let today_end = local_midnight(now_ms, tz_offset_minutes, 1);
    let tomorrow_end = local_midnight(now_ms, tz_offset_minutes, 2);
    let next7_end = today_start + ChronoDuration::days(7).num_milliseconds();
    let week_start = local_week_start(now_ms, tz_offset_minutes);
    let week_end = week_start + ChronoDuration::days(7).num_milliseconds();
    let (month_start, month_end) = local_month_bounds(now_ms, tz_offset_minutes);

    for msg in messages {
        *current.by_kind.entry(msg.kind).or_insert(0) += 1;
        *current.by_lifecycle.entry(msg.lifecycle.state).or_insert(0) += 1;
        if let Some(system) = &msg.origin.system {
            *current.by_origin_system.entry(system.clone()).or_insert(0) += 1;
        }
        current.total += 1;

        if msg.lifecycle.state == LifecycleState::Open {
            if let Some(due_at) = msg.timing.due_at {
                let due_at = due_at as i64;
                schedule.total += 1;
                *schedule.by_kind.entry(msg.kind).or_insert(0) += 1;
                if due_at < now_ms as i64 {
                    schedule.overdue += 1;
                } else if due_at < today_end {
                    schedule.today += 1;
                } else if due_at < tomorrow_end {
                    schedule.tomorrow += 1;
                }
                if due_at < next7_end {
                    schedule.next7_days += 1;
                }
                if (week_start..week_end).contains(&due_at) {
                    schedule.this_week += 1;
                }
                if (month_start..month_end).contains(&due_at) {
                    schedule.this_month += 1;
                }
            }
        }

        if matches!(msg.lifecycle.state, LifecycleState::Closed | LifecycleState::Deleted) {
            let changed_at = msg.lifecycle.state_changed_at as i64;
            if changed_at >= today_start {
                done.today += 1;
            }
            if changed_at >= week_start {
                done.this_week += 1;
            }
            if changed_at >= month_start {
                done.this_month += 1;
            }
            done.last_closed_at = Some(done.last_closed_at.unwrap_or(0).max(msg.lifecycle.state_changed_at));
        }
    }

    StatsSummary {
        current,
        schedule,
        done,
        io,
        meta: MetaStats { generated_at: now_ms, tz_offset_minutes },
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
