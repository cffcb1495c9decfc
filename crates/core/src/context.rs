// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mutable view handed to a migration body.
//!
//! A context wraps exactly one document for exactly one step. Getters
//! return `None` for both missing keys and values of the wrong shape;
//! only operations that would have to clobber data return an error.

use crate::{Document, MigrationError, Value};
use std::fmt;
use std::path::Path;

/// State and helpers for one migration step.
pub struct MigrationContext<'a> {
    path: Option<&'a Path>,
    document: &'a mut Document,
    current_version: u32,
    target_version: u32,
}

impl<'a> MigrationContext<'a> {
    /// Context for a document loaded from `path`.
    pub fn new(
        path: Option<&'a Path>,
        document: &'a mut Document,
        current_version: u32,
        target_version: u32,
    ) -> Self {
        Self {
            path,
            document,
            current_version,
            target_version,
        }
    }

    /// Context for an in-memory document.
    pub fn for_document(document: &'a mut Document, current_version: u32, target_version: u32) -> Self {
        Self::new(None, document, current_version, target_version)
    }

    /// File the document was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path
    }

    /// Version the document was at before this step.
    pub fn current_version(&self) -> u32 {
        self.current_version
    }

    /// Final version of the whole run, not of this step.
    pub fn target_version(&self) -> u32 {
        self.target_version
    }

    pub fn document(&self) -> &Document {
        self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        self.document
    }

    /// Deep copy of the document as it is now.
    pub fn copy_document(&self) -> Document {
        self.document.clone()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.document.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.document.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_list(&self, key: &str) -> Option<&Vec<Value>> {
        self.get(key).and_then(Value::as_sequence)
    }

    pub fn get_list_mut(&mut self, key: &str) -> Option<&mut Vec<Value>> {
        self.document.get_mut(key).and_then(Value::as_sequence_mut)
    }

    pub fn get_map(&self, key: &str) -> Option<&Document> {
        self.get(key).and_then(Value::as_map)
    }

    pub fn get_map_mut(&mut self, key: &str) -> Option<&mut Document> {
        self.document.get_mut(key).and_then(Value::as_map_mut)
    }

    /// Value at `value_key` inside the map at `map_key`.
    pub fn get_nested(&self, map_key: &str, value_key: &str) -> Option<&Value> {
        self.get_map(map_key).and_then(|map| map.get(value_key))
    }

    /// Nested map at `key`, inserting an empty one when the key is absent
    /// (or null).
    ///
    /// Fails rather than overwrite a key holding something else.
    pub fn get_or_create_map(&mut self, key: &str) -> Result<&mut Document, MigrationError> {
        if matches!(self.document.get(key), None | Some(Value::Null)) {
            self.document.insert(key, Document::new());
        }
        match self.document.get_mut(key) {
            Some(Value::Map(map)) => Ok(map),
            other => Err(MigrationError::TypeMismatch {
                key: key.to_string(),
                expected: "map",
                found: other.map_or("nothing", |v| v.kind()),
            }),
        }
    }

    /// Insert or overwrite a top-level key. Returns the previous value.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.document.insert(key, value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.document.remove(key)
    }

    /// Rename a top-level key, keeping its position. Returns false if
    /// `old_key` is absent.
    pub fn rename(&mut self, old_key: &str, new_key: &str) -> bool {
        self.document.rename(old_key, new_key)
    }

    /// Rename a key inside the map at `map_key`.
    pub fn rename_nested(&mut self, map_key: &str, old_key: &str, new_key: &str) -> bool {
        self.get_map_mut(map_key)
            .is_some_and(|map| map.rename(old_key, new_key))
    }

    /// Set `key` only if it is absent. Returns true if the value was set.
    pub fn set_default(&mut self, key: &str, value: impl Into<Value>) -> bool {
        if self.document.contains_key(key) {
            return false;
        }
        self.document.insert(key, value);
        true
    }

    /// Move a top-level value into the map at `target_map`, creating the
    /// map if needed. Returns `Ok(false)` if `source_key` is absent.
    pub fn move_to_nested(
        &mut self,
        source_key: &str,
        target_map: &str,
        target_key: &str,
    ) -> Result<bool, MigrationError> {
        if !self.document.contains_key(source_key) {
            return Ok(false);
        }
        // Check the destination first so a type mismatch leaves the source intact
        self.get_or_create_map(target_map)?;
        let Some(value) = self.document.remove(source_key) else {
            return Ok(false);
        };
        self.get_or_create_map(target_map)?.insert(target_key, value);
        Ok(true)
    }

    /// Move a value out of the map at `source_map` to the top level.
    pub fn move_from_nested(&mut self, source_map: &str, source_key: &str, target_key: &str) -> bool {
        let Some(value) = self
            .get_map_mut(source_map)
            .and_then(|map| map.remove(source_key))
        else {
            return false;
        };
        self.document.insert(target_key, value);
        true
    }
}

impl fmt::Debug for MigrationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationContext")
            .field("path", &self.path)
            .field("current_version", &self.current_version)
            .field("target_version", &self.target_version)
            .finish()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
