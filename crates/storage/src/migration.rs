// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot schema-version migrations (§4.2).
//!
//! A snapshot blob carries a `v` tag. `MigrationRegistry` walks a chain of
//! single-version-step migrations to bring an old snapshot up to the
//! version this build expects, the way a config loader upgrades an old
//! config file on read.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MigrationError {
    #[error("snapshot version {0} is newer than the version this build supports ({1})")]
    TooNew(u32, u32),
    #[error("no migration path from version {0} to {1}")]
    NoPath(u32, u32),
}

/// A single schema-version step.
pub trait Migration: Send + Sync {
    fn source_version(&self) -> u32;
    fn target_version(&self) -> u32;
    fn migrate(&self, snapshot: &mut Value) -> Result<(), MigrationError>;
}

pub struct MigrationRegistry {
    pub(crate) migrations: Vec<Box<dyn Migration>>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self { migrations: Vec::new() }
    }

    pub fn register(&mut self, migration: Box<dyn Migration>) {
        self.migrations.push(migration);
    }

    /// Walk the migration chain from `snapshot`'s own `v` field to `target`,
    /// applying each step's mutation and stamping the final `v`.
    pub fn migrate_to(&self, mut snapshot: Value, target: u32) -> Result<Value, MigrationError> {
        let mut current = snapshot.get("v").and_then(Value::as_u64).unwrap_or(0) as u32;
        if current > target {
            return Err(MigrationError::TooNew(current, target));
        }
        while current != target {
            let step = self.migrations.iter().find(|m| m.source_version() == current);
            match step {
                Some(migration) => {
                    migration.migrate(&mut snapshot)?;
                    current = migration.target_version();
                }
                None => return Err(MigrationError::NoPath(current, target)),
            }
        }
        if let Some(obj) = snapshot.as_object_mut() {
            obj.insert("v".into(), Value::from(target));
        }
        Ok(snapshot)
    }
}

impl Default for MigrationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "migration_tests.rs"]
mod tests;
