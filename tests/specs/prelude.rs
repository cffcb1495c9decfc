//! Test helpers for the end-to-end behavior tests.
//!
//! Provides a temp project dir and the example server config chain used
//! across specs.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use cfgmig_core::{migration, FnMigration};
use cfgmig_storage::{ConfigMigrator, ConfigMigratorBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Once;

pub use cfgmig_core::{document, Document, MigrationError, Value};
pub use cfgmig_storage::{BackupConfig, Format, MigratorError};

/// Schema version the example server config is currently at.
pub const SERVER_VERSION: u32 = 4;

/// Install a test-writer subscriber once; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

pub struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    /// Create an empty project
    pub fn empty() -> Self {
        init_tracing();
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a file inside the project
    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write a file at the given path (parent directories created automatically)
    pub fn file(&self, name: &str, content: &str) -> PathBuf {
        let full_path = self.join(name);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&full_path, content).unwrap();
        full_path
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.join(name)).unwrap()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.join(name).exists()
    }

    /// File names in the project root, sorted
    pub fn files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Assert file contents, with a readable diff on mismatch
    pub fn assert_file(&self, name: &str, expected: &str) {
        similar_asserts::assert_eq!(self.read(name), expected);
    }
}

/// v1 → v4 history of the example server config:
///
/// - v2 adds `timeout`
/// - v3 renames `host` to `hostname`
/// - v4 groups `dbUser`/`dbPassword` under `database`
pub fn server_migrations() -> Vec<FnMigration> {
    vec![
        migration(2, "Add timeout", |ctx| {
            ctx.set_default("timeout", 30);
            Ok(())
        }),
        migration(3, "Rename host to hostname", |ctx| {
            ctx.rename("host", "hostname");
            Ok(())
        }),
        migration(4, "Group database settings", |ctx| {
            ctx.move_to_nested("dbUser", "database", "user")?;
            ctx.move_to_nested("dbPassword", "database", "password")?;
            Ok(())
        }),
    ]
}

pub fn server_migrator() -> ConfigMigratorBuilder {
    ConfigMigrator::builder().register_all(server_migrations())
}

pub const SERVER_V1_YAML: &str = "\
version: 1
host: mc.example.org
port: 25565
dbUser: admin
dbPassword: hunter2
";

pub const SERVER_V4_YAML: &str = "\
version: 4
hostname: mc.example.org
port: 25565
timeout: 30
database:
  user: admin
  password: hunter2
";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    pub version: u32,
    pub hostname: String,
    pub port: u16,
    pub timeout: u32,
    pub database: DatabaseConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: SERVER_VERSION,
            hostname: "localhost".to_string(),
            port: 25565,
            timeout: 30,
            database: DatabaseConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
}
