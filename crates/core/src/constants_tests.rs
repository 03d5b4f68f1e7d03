// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn level_rejects_values_outside_the_closed_set() {
    assert!(Level::try_from(10).is_ok());
    assert!(Level::try_from(15).is_err());
    assert!(Level::try_from(-10).is_err());
}

#[test]
fn level_accepts_every_member_of_the_closed_set() {
    for v in [0, 10, 20, 30, 40, 50] {
        assert!(Level::try_from(v).is_ok());
    }
}

#[test]
fn lifecycle_state_quasi_deleted_classification() {
    assert!(!LifecycleState::Open.is_quasi_deleted());
    assert!(!LifecycleState::Acked.is_quasi_deleted());
    assert!(!LifecycleState::Snoozed.is_quasi_deleted());
    assert!(LifecycleState::Closed.is_quasi_deleted());
    assert!(LifecycleState::Deleted.is_quasi_deleted());
    assert!(LifecycleState::Expired.is_quasi_deleted());
}

#[test]
fn only_deleted_and_expired_are_retained_for_hard_delete() {
    assert!(!LifecycleState::Closed.is_retained_quasi_deleted());
    assert!(LifecycleState::Deleted.is_retained_quasi_deleted());
    assert!(LifecycleState::Expired.is_retained_quasi_deleted());
}

#[test]
fn only_deleted_and_expired_are_hidden_by_default() {
    assert!(!LifecycleState::Closed.is_hidden_by_default());
    assert!(LifecycleState::Deleted.is_hidden_by_default());
    assert!(LifecycleState::Expired.is_hidden_by_default());
}

#[test]
fn constants_serializes_with_lowercase_tags() {
    let json = serde_json::to_value(Constants::default()).unwrap();
    assert_eq!(json["kinds"][0], "task");
    assert_eq!(json["lifecycleStates"].as_array().is_none(), true); // field names are snake_case by default
    assert_eq!(json["lifecycle_states"][0], "open");
}
