// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-level migration: load, back up, migrate, save.
//!
//! ```text
//! load ─┬─ empty ──────────→ stamp target version, save
//!       ├─ at target ──────→ no-op (file untouched)
//!       └─ behind ── backup? ── execute ─┬─ ok ───→ save
//!                                        └─ fail ─→ file untouched
//! ```
//!
//! With `dry_run` set nothing is written: no stamp, no backup, no save.

use crate::typed;
use crate::{BackupConfig, DocumentStore, FsDocumentStore, MigratorError, StorageError};
use cfgmig_core::{
    Document, ExecutorBuilder, ExecutorOptions, Migration, MigrationContext, MigrationError,
    MigrationExecutor, MigrationRegistry, MigrationResult,
};
use chrono::Local;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Settings a host application can embed in its own config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigratorConfig {
    pub executor: ExecutorOptions,
    pub backups: BackupConfig,
}

/// Builder for [`ConfigMigrator`].
///
/// Registration errors are held until [`build`](Self::build) so calls can
/// be chained.
pub struct ConfigMigratorBuilder {
    registry: Arc<MigrationRegistry>,
    executor: ExecutorBuilder,
    backups: BackupConfig,
    store: Arc<dyn DocumentStore>,
    error: Option<MigrationError>,
}

impl ConfigMigratorBuilder {
    fn new(registry: Arc<MigrationRegistry>) -> Self {
        Self {
            executor: MigrationExecutor::builder(Arc::clone(&registry)),
            registry,
            backups: BackupConfig::default(),
            store: Arc::new(FsDocumentStore),
            error: None,
        }
    }

    pub fn register(mut self, migration: impl Migration + 'static) -> Self {
        if self.error.is_none() {
            self.error = self.registry.register(migration).err();
        }
        self
    }

    pub fn register_all<I, M>(mut self, migrations: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Migration + 'static,
    {
        if self.error.is_none() {
            self.error = self.registry.register_all(migrations).err();
        }
        self
    }

    /// Apply a full [`MigratorConfig`].
    pub fn config(mut self, config: MigratorConfig) -> Self {
        self.executor = self.executor.options(config.executor);
        self.backups = config.backups;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.executor = self.executor.strict(strict);
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.executor = self.executor.dry_run(dry_run);
        self
    }

    pub fn backups(mut self, backups: BackupConfig) -> Self {
        self.backups = backups;
        self
    }

    /// Turn backups on or off, keeping the suffix and timestamp settings.
    pub fn create_backups(mut self, enabled: bool) -> Self {
        self.backups.enabled = enabled;
        self
    }

    pub fn backup_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.backups.suffix = suffix.into();
        self
    }

    pub fn timestamped_backups(mut self, timestamped: bool) -> Self {
        self.backups.timestamped = timestamped;
        self
    }

    pub fn before_migration<F>(mut self, hook: F) -> Self
    where
        F: Fn(&dyn Migration) + Send + Sync + 'static,
    {
        self.executor = self.executor.before_migration(hook);
        self
    }

    pub fn after_migration<F>(mut self, hook: F) -> Self
    where
        F: Fn(&dyn Migration, &MigrationContext<'_>) + Send + Sync + 'static,
    {
        self.executor = self.executor.after_migration(hook);
        self
    }

    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&MigrationError) + Send + Sync + 'static,
    {
        self.executor = self.executor.on_error(hook);
        self
    }

    /// Replace the filesystem with another [`DocumentStore`].
    pub fn store(mut self, store: impl DocumentStore) -> Self {
        self.store = Arc::new(store);
        self
    }

    /// Fails with the first registration error, if any.
    pub fn build(self) -> Result<ConfigMigrator, MigrationError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(ConfigMigrator {
            registry: self.registry,
            executor: self.executor.build(),
            backups: self.backups,
            store: self.store,
        })
    }
}

/// Brings config files up to a target schema version.
pub struct ConfigMigrator {
    registry: Arc<MigrationRegistry>,
    executor: MigrationExecutor,
    backups: BackupConfig,
    store: Arc<dyn DocumentStore>,
}

impl ConfigMigrator {
    /// Builder with a fresh, empty registry.
    pub fn builder() -> ConfigMigratorBuilder {
        ConfigMigratorBuilder::new(Arc::new(MigrationRegistry::new()))
    }

    /// Builder over an existing (possibly frozen and shared) registry.
    pub fn with_registry(registry: Arc<MigrationRegistry>) -> ConfigMigratorBuilder {
        ConfigMigratorBuilder::new(registry)
    }

    /// Migrator with default settings for the given migrations.
    pub fn of<I, M>(migrations: I) -> Result<Self, MigrationError>
    where
        I: IntoIterator<Item = M>,
        M: Migration + 'static,
    {
        Self::builder().register_all(migrations).build()
    }

    pub fn registry(&self) -> &Arc<MigrationRegistry> {
        &self.registry
    }

    pub fn options(&self) -> ExecutorOptions {
        self.executor.options()
    }

    pub fn backups(&self) -> &BackupConfig {
        &self.backups
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    fn dry_run(&self) -> bool {
        self.executor.options().dry_run
    }

    /// Migrate the file at `path` to `target`.
    ///
    /// `Err` means the file couldn't be read, backed up or written. A
    /// failed migration is `Ok` with a failure result, and the file is
    /// left as it was.
    pub fn migrate(&self, path: &Path, target: u32) -> Result<MigrationResult, MigratorError> {
        let mut document = self.store.load(path)?;

        if document.is_empty() {
            document.set_version(target);
            if !self.dry_run() {
                self.store.save(path, &document)?;
                info!(path = %path.display(), version = target, "stamped fresh config");
            }
            return Ok(MigrationResult::no_migration_needed(target, document));
        }

        let current = document.version().map_err(StorageError::from)?;
        if current == target {
            debug!(path = %path.display(), version = current, "no migration needed");
            return Ok(MigrationResult::no_migration_needed(current, document));
        }

        if self.backups.enabled && current < target && !self.dry_run() {
            self.create_backup(path)?;
        }

        let result = self.executor.execute_at(path, &mut document, current, target);

        if result.is_success() && !self.dry_run() {
            self.store.save(path, result.document())?;
            info!(
                path = %path.display(),
                from = current,
                to = result.to_version(),
                "saved migrated config"
            );
        }
        Ok(result)
    }

    /// Migrate `path` and map the result onto `T`.
    ///
    /// A missing file is created from `T::default()` stamped with `target`.
    /// A failed migration surfaces its error unchanged as
    /// [`MigratorError::Migration`].
    pub fn migrate_and_load<T>(&self, path: &Path, target: u32) -> Result<T, MigratorError>
    where
        T: DeserializeOwned + Serialize + Default,
    {
        if !self.store.exists(path) {
            let mut document = typed::to_document(&T::default())?;
            document.set_version(target);
            if !self.dry_run() {
                self.store.save(path, &document)?;
                info!(path = %path.display(), version = target, "created default config");
            }
            return Ok(typed::from_document(&document)?);
        }

        match self.migrate(path, target)?.into_parts() {
            (_, Some(error)) => Err(MigratorError::Migration(error)),
            (report, None) => Ok(typed::from_document(&report.document)?),
        }
    }

    /// In-memory migration with no file I/O.
    pub fn migrate_data(&self, document: &mut Document, from: u32, to: u32) -> MigrationResult {
        self.executor.execute(document, from, to)
    }

    /// True if the file exists and is behind `target`.
    pub fn needs_migration(&self, path: &Path, target: u32) -> Result<bool, MigratorError> {
        if !self.store.exists(path) {
            return Ok(false);
        }
        Ok(self.store.read_version(path)? < target)
    }

    /// Version of the file, or `None` if it doesn't exist.
    pub fn get_version(&self, path: &Path) -> Result<Option<u32>, MigratorError> {
        if !self.store.exists(path) {
            return Ok(None);
        }
        Ok(Some(self.store.read_version(path)?))
    }

    pub fn can_migrate(&self, from: u32, to: u32) -> bool {
        self.executor.can_migrate(from, to)
    }

    fn create_backup(&self, path: &Path) -> Result<PathBuf, MigratorError> {
        let backup = self
            .backups
            .backup_path(path, Local::now().naive_local(), |p| self.store.exists(p));
        self.store
            .copy(path, &backup)
            .map_err(|source| MigratorError::Backup {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), backup = %backup.display(), "created backup");
        Ok(backup)
    }
}

impl std::fmt::Debug for ConfigMigrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigMigrator")
            .field("registry", &self.registry.to_string())
            .field("options", &self.executor.options())
            .field("backups", &self.backups)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "migrator_tests.rs"]
mod tests;
