// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by the migration engine.

use thiserror::Error;

/// Boxed error returned from a migration body.
///
/// Migration authors may bubble up any error with `?`. A boxed
/// [`MigrationError`] is propagated unchanged by the executor; anything
/// else is wrapped in [`MigrationError::StepFailed`].
pub type StepError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while registering or running migrations
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("invalid version range: cannot migrate from version {from} to version {to}")]
    InvalidRange { from: u32, to: u32 },

    #[error("missing migrations for versions: {0:?}")]
    MissingMigrations(Vec<u32>),

    #[error(
        "migration version mismatch: expected source version {expected}, \
         but migration is from {declared} to {target}"
    )]
    VersionMismatch {
        expected: u32,
        declared: u32,
        target: u32,
    },

    #[error("migration already registered for target version {0}")]
    DuplicateTargetVersion(u32),

    #[error("migration registry is frozen")]
    RegistryFrozen,

    #[error("expected {expected} at key '{key}', but found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid version: {0}")]
    InvalidVersion(String),

    #[error("{0}")]
    Failed(String),

    #[error("migration to version {version} failed: {source}")]
    StepFailed {
        version: u32,
        #[source]
        source: StepError,
    },
}

impl MigrationError {
    /// Domain failure raised from inside a migration body.
    pub fn failed(message: impl Into<String>) -> Self {
        MigrationError::Failed(message.into())
    }

    /// Recover a migration error from a step's boxed error, wrapping
    /// anything foreign with the version the step was migrating to.
    pub(crate) fn from_step(version: u32, err: StepError) -> Self {
        match err.downcast::<MigrationError>() {
            Ok(own) => *own,
            Err(source) => MigrationError::StepFailed { version, source },
        }
    }
}
