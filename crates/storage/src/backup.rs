// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backup naming policy.
//!
//! Fixed-suffix backups (`config.yml.bak`) are overwritten on every run.
//! Timestamped backups (`config-20260101-120000.yml.bak`) never overwrite
//! an earlier one: when two runs land in the same second a `-N` counter is
//! added after the timestamp.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Backup settings for [`ConfigMigrator`](crate::ConfigMigrator)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Copy the source file aside before migrating it
    pub enabled: bool,
    /// Appended to the backup file name
    pub suffix: String,
    /// Put the local time in the backup name
    pub timestamped: bool,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            suffix: ".bak".to_string(),
            timestamped: false,
        }
    }
}

impl BackupConfig {
    /// Backup location for `path` at time `now`.
    ///
    /// `exists` is consulted only for timestamped names, to step past
    /// backups already taken in the same second.
    pub fn backup_path(
        &self,
        path: &Path,
        now: NaiveDateTime,
        exists: impl Fn(&Path) -> bool,
    ) -> PathBuf {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if !self.timestamped {
            return path.with_file_name(format!("{file_name}{}", self.suffix));
        }

        // Dotfiles like `.env` have no extension to preserve
        let (stem, ext) = match file_name.rfind('.') {
            Some(dot) if dot > 0 => file_name.split_at(dot),
            _ => (file_name.as_str(), ""),
        };
        let stamp = now.format(TIMESTAMP_FORMAT);

        let candidate = path.with_file_name(format!("{stem}-{stamp}{ext}{}", self.suffix));
        if !exists(&candidate) {
            return candidate;
        }
        let mut n = 1u32;
        loop {
            let candidate =
                path.with_file_name(format!("{stem}-{stamp}-{n}{ext}{}", self.suffix));
            if !exists(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
#[path = "backup_tests.rs"]
mod tests;
