// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn fake_adapter_records_calls() {
    let adapter = FakeNotifyAdapter::new();
    adapter.notify("title", "body").await.unwrap();
    adapter.notify("title2", "body2").await.unwrap();

    let calls = adapter.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].title, "title");
    assert_eq!(calls[1].message, "body2");
}

#[tokio::test]
async fn fake_adapter_starts_empty() {
    let adapter = FakeNotifyAdapter::new();
    assert!(adapter.calls().is_empty());
}
