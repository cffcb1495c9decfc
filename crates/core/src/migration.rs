// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration migration steps.
//!
//! A migration transforms a document from [`Migration::source_version`]
//! to [`Migration::target_version`]. The executor stamps the new version
//! after the body succeeds, so bodies only touch the data they change.
//!
//! Guidelines for authors:
//! - tolerate missing fields (old files may predate them)
//! - leave unknown fields alone
//! - keep bodies short; there is no timeout at this layer

use crate::{MigrationContext, StepError};
use std::fmt;

/// A single versioned transformation step.
///
/// Implementations must be stateless: the same migration may run against
/// many documents and may be shared by several registries.
pub trait Migration: Send + Sync {
    /// Version this step upgrades from. Defaults to `target_version - 1`;
    /// override to consolidate several versions into one step.
    fn source_version(&self) -> u32 {
        self.target_version().saturating_sub(1)
    }

    /// Version the document is at once this step completes.
    fn target_version(&self) -> u32;

    /// Human-readable summary, used for step records and logs.
    fn description(&self) -> String {
        default_description(self.source_version(), self.target_version())
    }

    /// Transform the document held by `ctx`.
    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), StepError>;
}

/// The description used when a migration doesn't provide one.
pub fn default_description(source: u32, target: u32) -> String {
    format!("Migrate from version {source} to version {target}")
}

impl fmt::Debug for dyn Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration")
            .field("source_version", &self.source_version())
            .field("target_version", &self.target_version())
            .field("description", &self.description())
            .finish()
    }
}

type MigrateFn = dyn Fn(&mut MigrationContext<'_>) -> Result<(), StepError> + Send + Sync;

/// A migration backed by a closure. Built with [`migration`] or
/// [`migration_from`].
pub struct FnMigration {
    source: u32,
    target: u32,
    description: String,
    body: Box<MigrateFn>,
}

impl Migration for FnMigration {
    fn source_version(&self) -> u32 {
        self.source
    }

    fn target_version(&self) -> u32 {
        self.target
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), StepError> {
        (self.body)(ctx)
    }
}

/// Migration from `target - 1` to `target`.
///
/// ```
/// use cfgmig_core::migration;
///
/// let add_timeout = migration(2, "Add timeout field", |ctx| {
///     ctx.set_default("timeout", 30);
///     Ok(())
/// });
/// ```
pub fn migration<F>(target: u32, description: impl Into<String>, body: F) -> FnMigration
where
    F: Fn(&mut MigrationContext<'_>) -> Result<(), StepError> + Send + Sync + 'static,
{
    migration_from(target.saturating_sub(1), target, description, body)
}

/// Migration with an explicit source version, e.g. consolidating 2→4.
pub fn migration_from<F>(
    source: u32,
    target: u32,
    description: impl Into<String>,
    body: F,
) -> FnMigration
where
    F: Fn(&mut MigrationContext<'_>) -> Result<(), StepError> + Send + Sync + 'static,
{
    let mut description = description.into();
    if description.is_empty() {
        description = default_description(source, target);
    }
    FnMigration {
        source,
        target,
        description,
        body: Box::new(body),
    }
}

#[cfg(test)]
#[path = "migration_tests.rs"]
mod tests;
