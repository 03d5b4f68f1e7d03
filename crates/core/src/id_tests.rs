// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId("tst-");
}

#[test]
fn define_id_round_trips_through_string() {
    let id = TestId::from_string("tst-abc123");
    assert_eq!(id.as_str(), "tst-abc123");
    assert_eq!(id.suffix(), "abc123");
}

#[test]
fn define_id_new_has_prefix_and_is_unique() {
    let a = TestId::new();
    let b = TestId::new();
    assert!(a.as_str().starts_with(TestId::PREFIX));
    assert_ne!(a, b);
}

#[test]
fn define_id_hash_map_lookup() {
    let mut map = HashMap::new();
    map.insert(TestId::from_string("tst-k"), 42);
    assert_eq!(map.get("tst-k"), Some(&42));
}

#[test]
fn define_id_short_truncates_suffix() {
    let id = TestId::from_string("tst-abcdefghijklmnop");
    assert_eq!(id.short(4), "abcd");
}

#[test]
fn short_fn_truncates_and_passes_through() {
    let s = "abcdefghijklmnop";
    assert_eq!(short(s, 8), "abcdefgh");
    assert_eq!(short(s, 100), s);
    assert_eq!(short("abc", 8), "abc");
}

#[test]
fn idbuf_rejects_nothing_under_cap_and_borrows_as_str() {
    let buf = IdBuf::new("tst-short");
    assert_eq!(buf.as_str(), "tst-short");
    assert!(!buf.is_empty());
    assert!(IdBuf::empty().is_empty());
}
