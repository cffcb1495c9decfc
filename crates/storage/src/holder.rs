// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared, reloadable typed config.

use crate::{typed, ConfigMigrator, DocumentStore, MigratorError};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

type Loader<T> = Box<dyn Fn() -> Result<T, MigratorError> + Send + Sync>;
type ReloadHook<T> = Box<dyn Fn(&T) + Send + Sync>;

struct BackingFile {
    path: PathBuf,
    store: Arc<dyn DocumentStore>,
    /// Version every save is stamped with.
    version: u32,
}

/// Holds the current config behind an `Arc` so readers never block a
/// reload for longer than a pointer swap.
pub struct ConfigHolder<T> {
    current: RwLock<Arc<T>>,
    loader: Loader<T>,
    on_reload: Option<ReloadHook<T>>,
    backing: Option<BackingFile>,
}

impl<T> ConfigHolder<T>
where
    T: Send + Sync + 'static,
{
    /// Run `loader` once for the initial value.
    pub fn new<F>(loader: F) -> Result<Self, MigratorError>
    where
        F: Fn() -> Result<T, MigratorError> + Send + Sync + 'static,
    {
        let initial = loader()?;
        Ok(Self {
            current: RwLock::new(Arc::new(initial)),
            loader: Box::new(loader),
            on_reload: None,
            backing: None,
        })
    }

    /// Called with the new value after every successful reload.
    pub fn on_reload<F>(mut self, hook: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.on_reload = Some(Box::new(hook));
        self
    }

    pub fn get(&self) -> Arc<T> {
        self.current.read().clone()
    }

    /// Re-run the loader and swap in the result. On error the current
    /// value is kept. A panicking reload hook is logged and ignored.
    pub fn reload(&self) -> Result<Arc<T>, MigratorError> {
        let fresh = match (self.loader)() {
            Ok(config) => Arc::new(config),
            Err(e) => {
                warn!(error = %e, "config reload failed, keeping current config");
                return Err(e);
            }
        };
        *self.current.write() = Arc::clone(&fresh);
        if let Some(hook) = &self.on_reload {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| hook(&fresh))) {
                warn!(panic = %panic_message(payload.as_ref()), "reload callback panicked");
            }
        }
        Ok(fresh)
    }

    /// Swap in a new value without touching the file.
    pub fn replace(&self, config: T) -> Arc<T> {
        let config = Arc::new(config);
        *self.current.write() = Arc::clone(&config);
        config
    }

    pub fn path(&self) -> Option<&Path> {
        self.backing.as_ref().map(|b| b.path.as_path())
    }
}

impl<T> ConfigHolder<T>
where
    T: DeserializeOwned + Serialize + Default + Send + Sync + 'static,
{
    /// Holder that loads `path` through `migrator`, migrating it to
    /// `target` on every load.
    pub fn migrated(
        migrator: Arc<ConfigMigrator>,
        path: impl Into<PathBuf>,
        target: u32,
    ) -> Result<Self, MigratorError> {
        let path = path.into();
        let store = Arc::clone(migrator.store());
        let load_path = path.clone();
        let mut holder = Self::new(move || migrator.migrate_and_load(&load_path, target))?;
        holder.backing = Some(BackingFile {
            path,
            store,
            version: target,
        });
        Ok(holder)
    }

    /// Write the current value back to the file it was loaded from,
    /// stamped with the migration target.
    pub fn save(&self) -> Result<(), MigratorError> {
        let backing = self.backing.as_ref().ok_or(MigratorError::NoBackingFile)?;
        self.save_to(backing.store.as_ref(), &backing.path)?;
        info!(path = %backing.path.display(), version = backing.version, "saved config");
        Ok(())
    }

    /// Write the current value to `path`. Holders built with
    /// [`ConfigHolder::migrated`] stamp their target version; others
    /// write the value as serialized.
    pub fn save_to(&self, store: &dyn DocumentStore, path: &Path) -> Result<(), MigratorError> {
        let config = self.get();
        match &self.backing {
            Some(backing) => typed::save_at(store, path, &*config, backing.version)?,
            None => typed::save(store, path, &*config)?,
        }
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "holder_tests.rs"]
mod tests;
