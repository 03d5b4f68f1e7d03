// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hub-core: the canonical message entity, its validation/patch rules, and
//! the lifecycle and notification types shared by every other crate in the
//! workspace.

pub mod macros;

pub mod clock;
pub mod constants;
pub mod error;
pub mod event;
pub mod factory;
pub mod id;
pub mod lifecycle;
pub mod message;
pub mod refid;

pub use clock::{Clock, FakeClock, SystemClock};
pub use constants::{
    ActionType, AttachmentType, Constants, InvalidEnumValue, Kind, Level, LifecycleState,
    NotificationEvent, OriginType,
};
pub use error::HubError;
pub use event::NotifyBatch;
pub use factory::{apply_patch, create_message, CreateInput, Patch, TimingInput, TimingPatch, ValidationError};
pub use lifecycle::{classify_creation, is_immediately_due, may_recreate, CreationClass};
pub use message::{
    Action, Amount, Attachment, Audience, AudienceChannels, Details, Lifecycle, ListItem, Message,
    MetricValue, Metrics, Origin, Progress, Timing,
};
#[cfg(any(test, feature = "test-support"))]
pub use message::test_support::MessageBuilder;
pub use refid::MsgRef;
