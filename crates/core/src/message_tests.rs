// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::test_support::MessageBuilder;
use super::*;

#[test]
fn timing_is_due_when_notify_at_has_elapsed() {
    let mut timing = Timing { created_at: 0, notify_at: Some(100), ..Default::default() };
    assert!(!timing.is_due(50));
    assert!(timing.is_due(100));
    assert!(timing.is_due(200));

    timing.expires_at = Some(150);
    assert!(!timing.is_due(200));
}

#[test]
fn timing_without_notify_at_is_not_due() {
    let timing = Timing { created_at: 0, ..Default::default() };
    assert!(!timing.is_due(1_000));
}

#[test]
fn timing_is_expired_strictly_after_expires_at() {
    let timing = Timing { created_at: 0, expires_at: Some(100), ..Default::default() };
    assert!(!timing.is_expired(100));
    assert!(timing.is_expired(101));
}

#[test]
fn progress_sets_started_at_once_on_first_nonzero_percentage() {
    let mut progress = Progress::default();
    progress.apply_percentage(10, 1_000);
    assert_eq!(progress.started_at, Some(1_000));

    progress.apply_percentage(20, 2_000);
    assert_eq!(progress.started_at, Some(1_000));
}

#[test]
fn progress_sets_and_clears_finished_at_across_the_100_boundary() {
    let mut progress = Progress::default();
    progress.apply_percentage(100, 1_000);
    assert_eq!(progress.finished_at, Some(1_000));

    progress.apply_percentage(90, 2_000);
    assert_eq!(progress.finished_at, None);
}

#[test]
fn audience_channels_include_list_gates_routing() {
    let channels = AudienceChannels { include: Some(vec!["kitchen".into()]), exclude: None };
    assert!(channels.routes_to(Some("kitchen")));
    assert!(!channels.routes_to(Some("office")));
}

#[test]
fn audience_channels_exclude_wins_over_include() {
    let channels = AudienceChannels {
        include: Some(vec!["*".into()]),
        exclude: Some(vec!["office".into()]),
    };
    assert!(channels.routes_to(Some("kitchen")));
    assert!(!channels.routes_to(Some("office")));
}

#[test]
fn audience_channels_wildcard_matches_anything() {
    let channels = AudienceChannels { include: Some(vec!["all".into()]), exclude: None };
    assert!(channels.routes_to(Some("anything")));
}

#[test]
fn audience_with_no_channels_routes_everywhere() {
    let audience = Audience { tags: None, channels: None };
    assert!(audience.routes_to(Some("kitchen")));
    assert!(audience.routes_to(None));
}

#[test]
fn metrics_merge_upserts_and_removes_by_key() {
    let mut metrics = Metrics::new();
    let mut patch = indexmap::IndexMap::new();
    patch.insert("temp".to_string(), Some(MetricValue { val: 21.5, unit: Some("C".into()), ts: 10 }));
    metrics.merge(patch);
    assert_eq!(metrics.0.get("temp").unwrap().val, 21.5);

    let mut removal = indexmap::IndexMap::new();
    removal.insert("temp".to_string(), None);
    metrics.merge(removal);
    assert!(metrics.is_empty());
}

#[test]
fn metrics_serialize_as_tagged_map_envelope() {
    let mut metrics = Metrics::new();
    metrics.0.insert("temp".to_string(), MetricValue { val: 1.0, unit: None, ts: 5 });
    let json = serde_json::to_value(&metrics).unwrap();
    assert_eq!(json["__type"], "Map");
    assert_eq!(json["value"][0][0], "temp");
    assert_eq!(json["value"][0][1]["val"], 1.0);

    let round_tripped: Metrics = serde_json::from_value(json).unwrap();
    assert_eq!(round_tripped.0.get("temp").unwrap().val, 1.0);
}

#[test]
fn message_serializes_with_camel_case_wire_fields() {
    let message = MessageBuilder::default().msg_ref("t1").build();
    let json = serde_json::to_value(&message).unwrap();
    assert_eq!(json["ref"], "t1");
    assert_eq!(json["lifecycle"]["state"], "open");
    assert!(json.get("listItems").is_some());
    assert!(json.get("list_items").is_none());
}

#[test]
fn message_round_trips_through_json() {
    let message = MessageBuilder::default()
        .msg_ref("round-trip")
        .level(Level::L30)
        .build();
    let json = serde_json::to_string(&message).unwrap();
    let back: Message = serde_json::from_str(&json).unwrap();
    assert_eq!(back, message);
}
