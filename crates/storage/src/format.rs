// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk document formats.

use crate::StorageError;
use cfgmig_core::{version_from_value, Document, Value};
use serde::Deserialize;
use std::path::Path;

/// Serialization format of a config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Yaml,
    Json,
    Toml,
}

/// Only the version field; everything else in the file is skipped.
#[derive(Deserialize)]
struct VersionProbe {
    #[serde(default)]
    version: Option<Value>,
}

impl Format {
    /// Pick a format from the file extension. Unknown or missing
    /// extensions are treated as YAML.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Format::Json,
            Some("toml") => Format::Toml,
            _ => Format::Yaml,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::Yaml => "yaml",
            Format::Json => "json",
            Format::Toml => "toml",
        }
    }

    /// Parse a document. Blank input (whitespace or comments only) is an
    /// empty document.
    pub fn parse(self, input: &str) -> Result<Document, StorageError> {
        if is_blank(input) {
            return Ok(Document::new());
        }
        let document = match self {
            Format::Yaml => serde_yaml::from_str(input)?,
            Format::Json => serde_json::from_str(input)?,
            Format::Toml => toml::from_str(input)?,
        };
        Ok(document)
    }

    /// Render a document in block layout with a trailing newline.
    ///
    /// TOML has no null, so null values are dropped from TOML output,
    /// both as map entries and as sequence elements.
    pub fn render(self, document: &Document) -> Result<String, StorageError> {
        let mut out = match self {
            Format::Yaml => serde_yaml::to_string(document)?,
            Format::Json => serde_json::to_string_pretty(document)?,
            Format::Toml => toml::to_string(&without_nulls(document))?,
        };
        if !out.ends_with('\n') {
            out.push('\n');
        }
        Ok(out)
    }

    /// Read the schema version without building the whole document.
    pub fn read_version(self, input: &str) -> Result<u32, StorageError> {
        if is_blank(input) {
            return Ok(0);
        }
        let probe: Option<VersionProbe> = match self {
            Format::Yaml => serde_yaml::from_str(input)?,
            Format::Json => serde_json::from_str(input)?,
            Format::Toml => Some(toml::from_str(input)?),
        };
        match probe.and_then(|p| p.version) {
            Some(value) => Ok(version_from_value(&value)?),
            None => Ok(0),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn without_nulls(document: &Document) -> Document {
    document
        .iter()
        .filter(|(_, value)| !matches!(value, Value::Null))
        .map(|(key, value)| (key.to_string(), prune_nulls(value)))
        .collect()
}

fn prune_nulls(value: &Value) -> Value {
    match value {
        Value::Map(map) => Value::Map(without_nulls(map)),
        Value::Sequence(items) => Value::Sequence(
            items
                .iter()
                .filter(|item| !matches!(item, Value::Null))
                .map(prune_nulls)
                .collect(),
        ),
        other => other.clone(),
    }
}

fn is_blank(input: &str) -> bool {
    input.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

/// Parse `input` as `format`.
pub fn load_from_str(input: &str, format: Format) -> Result<Document, StorageError> {
    format.parse(input)
}

/// Render `document` as `format`.
pub fn save_to_string(document: &Document, format: Format) -> Result<String, StorageError> {
    format.render(document)
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
