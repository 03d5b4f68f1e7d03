// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn may_recreate_allows_purely_quasi_deleted_priors() {
    assert!(may_recreate(&[LifecycleState::Closed, LifecycleState::Deleted]));
    assert!(may_recreate(&[LifecycleState::Expired]));
}

#[test]
fn may_recreate_rejects_any_active_prior() {
    assert!(!may_recreate(&[LifecycleState::Open]));
    assert!(!may_recreate(&[LifecycleState::Closed, LifecycleState::Acked]));
}

#[test]
fn may_recreate_rejects_empty_priors() {
    assert!(!may_recreate(&[]));
}

#[test]
fn classify_creation_with_no_priors_is_added() {
    assert_eq!(classify_creation(false, None, None, 1_000), CreationClass::Added);
}

#[test]
fn classify_creation_within_cooldown_is_recovered() {
    let class = classify_creation(true, Some(1_000), Some(500), 1_400);
    assert_eq!(class, CreationClass::Recovered);
}

#[test]
fn classify_creation_beyond_cooldown_is_recreated() {
    let class = classify_creation(true, Some(1_000), Some(500), 1_600);
    assert_eq!(class, CreationClass::Recreated);
}

#[test]
fn classify_creation_without_cooldown_is_recreated() {
    let class = classify_creation(true, Some(1_000), None, 1_001);
    assert_eq!(class, CreationClass::Recreated);
}

#[test]
fn immediately_due_requires_open_state_and_no_notify_at() {
    assert!(is_immediately_due(LifecycleState::Open, None, CreationClass::Added));
    assert!(!is_immediately_due(LifecycleState::Open, Some(10), CreationClass::Added));
    assert!(!is_immediately_due(LifecycleState::Acked, None, CreationClass::Added));
}

#[test]
fn recovered_creation_is_never_immediately_due() {
    assert!(!is_immediately_due(LifecycleState::Open, None, CreationClass::Recovered));
}
