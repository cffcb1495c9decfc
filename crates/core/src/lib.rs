// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cfgmig-core: versioned migration engine for configuration documents
//!
//! Documents are ordered key/value trees carrying a top-level `version`.
//! Migrations are registered by target version in a [`MigrationRegistry`];
//! a [`MigrationExecutor`] walks a version range, applying each step
//! through a [`MigrationContext`] and reporting a [`MigrationResult`].

mod context;
mod error;
mod executor;
mod migration;
mod registry;
mod result;
mod value;

pub use context::MigrationContext;
pub use error::{MigrationError, StepError};
pub use executor::{ExecutorBuilder, ExecutorOptions, MigrationExecutor};
pub use migration::{default_description, migration, migration_from, FnMigration, Migration};
pub use registry::MigrationRegistry;
pub use result::{MigrationReport, MigrationResult, MigrationStep};
pub use value::{version_from_value, Document, Value, VERSION_KEY};
