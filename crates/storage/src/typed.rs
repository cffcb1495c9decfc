// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mapping between raw documents and typed config structs.
//!
//! Conversion goes through `serde_json::Value`, so any `Deserialize` type
//! works. Fields missing from a document fall back to the type's serde
//! defaults (`#[serde(default)]`).

use crate::{DocumentStore, StorageError};
use cfgmig_core::Document;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::info;

pub fn from_document<T: DeserializeOwned>(document: &Document) -> Result<T, serde_json::Error> {
    let value = serde_json::to_value(document)?;
    serde_json::from_value(value)
}

/// Serialize a config into a document. Field order follows the type's
/// declaration order.
pub fn to_document<T: Serialize>(config: &T) -> Result<Document, serde_json::Error> {
    let value = serde_json::to_value(config)?;
    serde_json::from_value(value)
}

pub fn load<T: DeserializeOwned>(store: &dyn DocumentStore, path: &Path) -> Result<T, StorageError> {
    let document = store.load(path)?;
    Ok(from_document(&document)?)
}

/// Load `path`, or write `T::default()` there first, stamped with
/// `version`, if it doesn't exist.
pub fn load_or_create<T>(
    store: &dyn DocumentStore,
    path: &Path,
    version: u32,
) -> Result<T, StorageError>
where
    T: DeserializeOwned + Serialize + Default,
{
    if store.exists(path) {
        return load(store, path);
    }
    let mut document = to_document(&T::default())?;
    document.set_version(version);
    store.save(path, &document)?;
    info!(path = %path.display(), version, "created default config");
    Ok(from_document(&document)?)
}

pub fn save<T: Serialize>(
    store: &dyn DocumentStore,
    path: &Path,
    config: &T,
) -> Result<(), StorageError> {
    let document = to_document(config)?;
    store.save(path, &document)
}

/// Save `config` with the `version` field forced to `version`, whether or
/// not `T` carries one.
pub fn save_at<T: Serialize>(
    store: &dyn DocumentStore,
    path: &Path,
    config: &T,
    version: u32,
) -> Result<(), StorageError> {
    let mut document = to_document(config)?;
    document.set_version(version);
    store.save(path, &document)
}

#[cfg(test)]
#[path = "typed_tests.rs"]
mod tests;
