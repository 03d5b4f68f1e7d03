// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn ping_round_trips() {
    let json = serde_json::to_string(&Request::Ping).expect("serialize");
    let back: Request = serde_json::from_str(&json).expect("deserialize");
    assert!(matches!(back, Request::Ping));
}

#[test]
fn stats_get_defaults_include_to_false() {
    let request: Request = serde_json::from_str(r#"{"type":"StatsGet"}"#).expect("deserialize");
    match request {
        Request::StatsGet { include } => {
            assert!(!include.archive_size);
            assert_eq!(include.archive_size_max_age_ms, None);
        }
        other => panic!("expected StatsGet, got {other:?}"),
    }
}

#[test]
fn stats_get_accepts_explicit_include() {
    let request: Request =
        serde_json::from_str(r#"{"type":"StatsGet","include":{"archiveSize":true}}"#).expect("deserialize");
    match request {
        Request::StatsGet { include } => assert!(include.archive_size),
        other => panic!("expected StatsGet, got {other:?}"),
    }
}

#[test]
fn messages_query_flattens_where_sort_page() {
    let request: Request = serde_json::from_str(
        r#"{"type":"MessagesQuery","where":{"kind":"task"},"sort":[{"field":"ref","dir":"asc"}]}"#,
    )
    .expect("deserialize");
    assert!(matches!(request, Request::MessagesQuery { .. }));
}

#[test]
fn messages_delete_carries_refs() {
    let request: Request =
        serde_json::from_str(r#"{"type":"MessagesDelete","refs":["a","b"]}"#).expect("deserialize");
    match request {
        Request::MessagesDelete { refs } => assert_eq!(refs, vec!["a".to_string(), "b".to_string()]),
        other => panic!("expected MessagesDelete, got {other:?}"),
    }
}

#[test]
fn message_snooze_carries_ref_and_until() {
    let request: Request =
        serde_json::from_str(r#"{"type":"MessageSnooze","ref":"t1","until":123}"#).expect("deserialize");
    match request {
        Request::MessageSnooze { r#ref, until } => {
            assert_eq!(r#ref, "t1");
            assert_eq!(until, 123);
        }
        other => panic!("expected MessageSnooze, got {other:?}"),
    }
}

#[test]
fn unknown_type_tag_is_rejected() {
    let result: Result<Request, _> = serde_json::from_str(r#"{"type":"NotARealCommand"}"#);
    assert!(result.is_err());
}
