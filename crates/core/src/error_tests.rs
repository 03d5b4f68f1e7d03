// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn validation_error_maps_to_bad_request() {
    let err = HubError::Validation(ValidationError::EmptyRef);
    assert_eq!(err.code(), "BAD_REQUEST");
}

#[test]
fn not_found_maps_to_not_found() {
    let err = HubError::NotFound(MsgRef::new("x"));
    assert_eq!(err.code(), "NOT_FOUND");
}

#[test]
fn conflict_maps_to_conflict() {
    let err = HubError::Conflict(MsgRef::new("x"));
    assert_eq!(err.code(), "CONFLICT");
}

#[test]
fn not_ready_maps_to_not_ready() {
    assert_eq!(HubError::NotReady.code(), "NOT_READY");
}
