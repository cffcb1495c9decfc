// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! File layer for cfgmig: raw YAML/JSON/TOML documents, backups, typed
//! loading and the [`ConfigMigrator`] orchestrator.

mod backup;
mod error;
mod format;
mod holder;
mod migrator;
mod store;
pub mod typed;

pub use backup::BackupConfig;
pub use error::{MigratorError, StorageError};
pub use format::{load_from_str, save_to_string, Format};
pub use holder::ConfigHolder;
pub use migrator::{ConfigMigrator, ConfigMigratorBuilder, MigratorConfig};
pub use store::{DocumentStore, FsDocumentStore};
