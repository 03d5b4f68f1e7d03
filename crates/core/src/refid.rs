// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The message `ref`: an immutable, caller-supplied primary key.
//!
//! Unlike the generated ids in [`crate::id`], a `ref` is chosen by the
//! producer plugin (e.g. `"dwd.warning.123"`) and has no length cap or
//! type prefix, so it gets its own small newtype rather than riding on
//! `define_id!`.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::borrow::Borrow;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MsgRef(SmolStr);

impl MsgRef {
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(SmolStr::new(s.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Path-safe segments for the archive's per-ref JSONL layout: dots split
    /// into subdirectories (`"a.b.c"` → `["a", "b", "c"]`).
    pub fn path_segments(&self) -> Vec<&str> {
        self.0.split('.').collect()
    }
}

impl fmt::Display for MsgRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MsgRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for MsgRef {
    fn from(s: String) -> Self {
        Self(SmolStr::new(s))
    }
}

impl AsRef<str> for MsgRef {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Borrow<str> for MsgRef {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq<str> for MsgRef {
    fn eq(&self, other: &str) -> bool {
        self.0.as_str() == other
    }
}

impl PartialEq<&str> for MsgRef {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_str() == *other
    }
}

#[cfg(test)]
#[path = "refid_tests.rs"]
mod tests;
