// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage and orchestration errors.

use cfgmig_core::MigrationError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from reading or writing raw documents
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error(transparent)]
    Version(#[from] MigrationError),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors from [`ConfigMigrator`](crate::ConfigMigrator) operations.
///
/// Disk problems (`Storage`, `Backup`) are kept apart from a broken
/// transform (`Migration`).
#[derive(Debug, Error)]
pub enum MigratorError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to create backup of {}: {source}", path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: StorageError,
    },
    #[error(transparent)]
    Migration(#[from] MigrationError),
    #[error("failed to map migrated document: {0}")]
    Typed(#[from] serde_json::Error),
    #[error("config holder has no backing file")]
    NoBackingFile,
}
