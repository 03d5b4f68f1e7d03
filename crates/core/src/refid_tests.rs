// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

#[test]
fn path_segments_split_on_dots() {
    let r = MsgRef::new("dwd.warning.123");
    assert_eq!(r.path_segments(), vec!["dwd", "warning", "123"]);
}

#[test]
fn path_segments_with_no_dots_is_single_segment() {
    let r = MsgRef::new("t1");
    assert_eq!(r.path_segments(), vec!["t1"]);
}

#[test]
fn hashmap_lookup_by_borrowed_str() {
    let mut map = HashMap::new();
    map.insert(MsgRef::new("t1"), 1);
    assert_eq!(map.get("t1"), Some(&1));
}

#[test]
fn equality_against_str_literal() {
    let r = MsgRef::new("t1");
    assert_eq!(r, "t1");
    assert_eq!(r, *"t1");
}

#[test]
fn serializes_as_bare_string() {
    let r = MsgRef::new("t1");
    assert_eq!(serde_json::to_string(&r).unwrap(), "\"t1\"");
}
