// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Raw document persistence.
//!
//! All file access made by the migrator goes through [`DocumentStore`],
//! so orchestration can be tested against an in-memory fake with
//! injected failures.

use crate::{Format, StorageError};
use cfgmig_core::Document;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Trait abstracting document I/O for testability.
pub trait DocumentStore: Send + Sync + 'static {
    fn exists(&self, path: &Path) -> bool;

    /// Load a document. A missing file is an empty document.
    fn load(&self, path: &Path) -> Result<Document, StorageError>;

    /// Persist a document, creating parent directories as needed.
    fn save(&self, path: &Path, document: &Document) -> Result<(), StorageError>;

    /// Schema version of the file at `path`; 0 if it is missing or
    /// carries no version.
    fn read_version(&self, path: &Path) -> Result<u32, StorageError>;

    /// Copy a file verbatim, replacing `to` if it exists.
    fn copy(&self, from: &Path, to: &Path) -> Result<(), StorageError>;
}

/// Filesystem store; the format is chosen from each path's extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDocumentStore;

impl FsDocumentStore {
    fn read(path: &Path) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }
}

impl DocumentStore for FsDocumentStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn load(&self, path: &Path) -> Result<Document, StorageError> {
        match Self::read(path)? {
            Some(text) => Format::from_path(path).parse(&text),
            None => Ok(Document::new()),
        }
    }

    /// Write to a sibling `.tmp` file, sync, then rename over `path` so a
    /// crash mid-write never leaves a truncated config behind.
    fn save(&self, path: &Path, document: &Document) -> Result<(), StorageError> {
        let text = Format::from_path(path).render(document)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let tmp_path = tmp_path(path);
        let written = write_synced(&tmp_path, &text)
            .and_then(|()| fs::rename(&tmp_path, path).map_err(|e| StorageError::io(path, e)));
        if written.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        written
    }

    fn read_version(&self, path: &Path) -> Result<u32, StorageError> {
        match Self::read(path)? {
            Some(text) => Format::from_path(path).read_version(&text),
            None => Ok(0),
        }
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<(), StorageError> {
        fs::copy(from, to).map_err(|e| StorageError::io(from, e))?;
        Ok(())
    }
}

fn write_synced(path: &Path, text: &str) -> Result<(), StorageError> {
    let mut file = File::create(path).map_err(|e| StorageError::io(path, e))?;
    file.write_all(text.as_bytes())
        .and_then(|()| file.sync_all())
        .map_err(|e| StorageError::io(path, e))
}

/// `config.yml` → `config.yml.tmp`
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
