// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host-facing adapters: Notify delivery/fan-out (§4.5) and the Ingest
//! plugin façade (§4.6).

pub mod dispatch;
pub mod ingest;
pub mod notify;

pub use dispatch::{dispatch_all, DynNotifyPlugin, NotifyPlugin, QuietHours};
pub use ingest::{
    IngestContext, IngestHost, IngestPlugin, ManagedObjectStore, ManagedObjectsReporter,
    MapOptionsResolver, MutationSink, OptionsResolver, ScopedTimers, SubscriptionRegistry,
    SubscriptionStore,
};
pub use notify::{DesktopNotifyAdapter, NotifyAdapter, NotifyError};

#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeNotifyAdapter, NotifyCall};
