// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Creation classification and quasi-delete guards for `add_message` (§4.7).
//!
//! Pure decision logic, kept separate from the Store so it can be
//! unit-tested without a running event queue.

use crate::constants::LifecycleState;

/// How a newly added `ref` relates to any prior entries sharing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationClass {
    /// No prior entry for this ref existed.
    Added,
    /// Prior quasi-deleted entries existed, and the gap since their purge
    /// exceeded the new message's cooldown (or there was no cooldown/purge).
    Recreated,
    /// Prior quasi-deleted entries existed and the new message arrived
    /// within its own `timing.cooldown` of their purge.
    Recovered,
}

/// Whether `add_message` may purge-and-recreate for the given set of prior
/// states sharing the incoming `ref`. True only if every prior entry is
/// already quasi-deleted (`{closed, deleted, expired}`).
pub fn may_recreate(prior_states: &[LifecycleState]) -> bool {
    !prior_states.is_empty() && prior_states.iter().all(|s| s.is_quasi_deleted())
}

/// Classify a creation given the prior quasi-deleted states purged to make
/// room for it, the timestamp of that purge (if any), and the new
/// message's `timing.cooldown`.
pub fn classify_creation(
    had_prior_entries: bool,
    purged_at: Option<u64>,
    cooldown: Option<u64>,
    now_ms: u64,
) -> CreationClass {
    if !had_prior_entries {
        return CreationClass::Added;
    }
    match (purged_at, cooldown) {
        (Some(purged_at), Some(cooldown)) if now_ms.saturating_sub(purged_at) <= cooldown => {
            CreationClass::Recovered
        }
        _ => CreationClass::Recreated,
    }
}

/// §4.7 step 5: a fresh `open` message with no finite `notifyAt` is due
/// immediately, unless it was classified as a `recovered` recreation.
pub fn is_immediately_due(
    state: LifecycleState,
    notify_at: Option<u64>,
    class: CreationClass,
) -> bool {
    state == LifecycleState::Open && notify_at.is_none() && class != CreationClass::Recovered
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
