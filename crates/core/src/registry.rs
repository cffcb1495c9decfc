// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Version-indexed store of migrations.
//!
//! Migrations are keyed by target version in an ordered map behind a
//! read/write lock, so one registry can be built at startup and shared by
//! concurrent executors. [`MigrationRegistry::immutable_copy`] produces a
//! frozen snapshot that rejects further mutation.

use crate::{Migration, MigrationError};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;
use std::sync::Arc;

/// Ordered index of migrations keyed by target version.
#[derive(Default)]
pub struct MigrationRegistry {
    migrations: RwLock<BTreeMap<u32, Arc<dyn Migration>>>,
    frozen: bool,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `migrations`. Fails on a duplicate target version.
    pub fn of<I, M>(migrations: I) -> Result<Self, MigrationError>
    where
        I: IntoIterator<Item = M>,
        M: Migration + 'static,
    {
        let registry = Self::new();
        registry.register_all(migrations)?;
        Ok(registry)
    }

    /// Register a migration under its target version.
    pub fn register(&self, migration: impl Migration + 'static) -> Result<(), MigrationError> {
        self.register_arc(Arc::new(migration))
    }

    /// Register an already shared migration.
    pub fn register_arc(&self, migration: Arc<dyn Migration>) -> Result<(), MigrationError> {
        self.check_mutable()?;
        let target = migration.target_version();
        let mut migrations = self.migrations.write();
        if migrations.contains_key(&target) {
            return Err(MigrationError::DuplicateTargetVersion(target));
        }
        migrations.insert(target, migration);
        Ok(())
    }

    /// Register several migrations, stopping at the first duplicate.
    pub fn register_all<I, M>(&self, migrations: I) -> Result<(), MigrationError>
    where
        I: IntoIterator<Item = M>,
        M: Migration + 'static,
    {
        for migration in migrations {
            self.register(migration)?;
        }
        Ok(())
    }

    /// Insert or overwrite; returns the migration previously registered
    /// for the same target version.
    pub fn register_or_replace(
        &self,
        migration: impl Migration + 'static,
    ) -> Result<Option<Arc<dyn Migration>>, MigrationError> {
        self.check_mutable()?;
        let migration: Arc<dyn Migration> = Arc::new(migration);
        Ok(self
            .migrations
            .write()
            .insert(migration.target_version(), migration))
    }

    pub fn get(&self, target_version: u32) -> Option<Arc<dyn Migration>> {
        self.migrations.read().get(&target_version).cloned()
    }

    pub fn contains(&self, target_version: u32) -> bool {
        self.migrations.read().contains_key(&target_version)
    }

    pub fn remove(&self, target_version: u32) -> Result<Option<Arc<dyn Migration>>, MigrationError> {
        self.check_mutable()?;
        Ok(self.migrations.write().remove(&target_version))
    }

    pub fn clear(&self) -> Result<(), MigrationError> {
        self.check_mutable()?;
        self.migrations.write().clear();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.migrations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.read().is_empty()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// All migrations in ascending target-version order.
    pub fn all_migrations(&self) -> Vec<Arc<dyn Migration>> {
        self.migrations.read().values().cloned().collect()
    }

    /// All registered target versions, ascending.
    pub fn all_versions(&self) -> Vec<u32> {
        self.migrations.read().keys().copied().collect()
    }

    pub fn highest_version(&self) -> Option<u32> {
        self.migrations.read().keys().next_back().copied()
    }

    pub fn lowest_version(&self) -> Option<u32> {
        self.migrations.read().keys().next().copied()
    }

    /// Migrations whose target version lies in `(from, to]`, ascending.
    ///
    /// An empty range yields nothing; a reversed range is a caller bug.
    pub fn migrations_in_range(
        &self,
        from: u32,
        to: u32,
    ) -> Result<Vec<Arc<dyn Migration>>, MigrationError> {
        if from > to {
            return Err(MigrationError::InvalidRange { from, to });
        }
        if from == to {
            return Ok(Vec::new());
        }
        Ok(self
            .migrations
            .read()
            .range((Bound::Excluded(from), Bound::Included(to)))
            .map(|(_, m)| Arc::clone(m))
            .collect())
    }

    /// Versions in `(from, to]` with no registered migration.
    pub fn find_missing_migrations(&self, from: u32, to: u32) -> Vec<u32> {
        if from >= to {
            return Vec::new();
        }
        let migrations = self.migrations.read();
        (from + 1..=to)
            .filter(|version| !migrations.contains_key(version))
            .collect()
    }

    pub fn has_complete_migration_chain(&self, from: u32, to: u32) -> bool {
        self.find_missing_migrations(from, to).is_empty()
    }

    /// Frozen snapshot of the current contents.
    pub fn immutable_copy(&self) -> Self {
        Self {
            migrations: RwLock::new(self.migrations.read().clone()),
            frozen: true,
        }
    }

    fn check_mutable(&self) -> Result<(), MigrationError> {
        if self.frozen {
            return Err(MigrationError::RegistryFrozen);
        }
        Ok(())
    }
}

impl fmt::Display for MigrationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let versions = self.all_versions();
        if versions.is_empty() {
            return write!(f, "MigrationRegistry[empty]");
        }
        write!(f, "MigrationRegistry[versions={versions:?}]")
    }
}

impl fmt::Debug for MigrationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationRegistry")
            .field("versions", &self.all_versions())
            .field("frozen", &self.frozen)
            .finish()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
