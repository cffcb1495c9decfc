//! Migration failure specs
//!
//! Verify failures are reported with the steps that completed and never
//! reach the file on disk.

use crate::prelude::*;
use cfgmig_core::migration;
use cfgmig_storage::ConfigMigrator;

#[test]
fn malformed_step_keeps_file_and_reports_progress() {
    let project = Project::empty();
    let original = "version: 3\nhostname: h\ndbUser: u\ndatabase: not-a-map\n";
    let path = project.file("config.yml", original);
    let migrator = server_migrator().build().unwrap();

    let result = migrator.migrate(&path, 4).unwrap();

    assert!(!result.is_success());
    assert_eq!(result.to_version(), 3);
    assert!(result.steps().is_empty());
    let err = result.error().unwrap();
    assert!(
        matches!(err, MigrationError::TypeMismatch { key, .. } if key == "database"),
        "{err}"
    );
    project.assert_file("config.yml", original);
}

#[test]
fn gap_in_chain_is_rejected_before_any_step() {
    let project = Project::empty();
    let path = project.file("config.yml", "version: 1\nhost: h\n");
    let migrator = ConfigMigrator::builder()
        .register(migration(2, "two", |ctx| {
            ctx.set("two", true);
            Ok(())
        }))
        .register(migration(4, "four", |_| Ok(())))
        .build()
        .unwrap();

    assert!(!migrator.can_migrate(1, 4));
    let result = migrator.migrate(&path, 4).unwrap();

    assert!(matches!(
        result.error(),
        Some(MigrationError::MissingMigrations(missing)) if missing == &vec![3]
    ));
    assert!(!result.document().contains_key("two"));
    project.assert_file("config.yml", "version: 1\nhost: h\n");
}

#[test]
fn downgrade_is_an_invalid_range() {
    let project = Project::empty();
    let path = project.file("config.yml", "version: 4\n");
    let migrator = server_migrator().build().unwrap();

    let result = migrator.migrate(&path, 2).unwrap();

    assert_eq!(
        result.error().map(ToString::to_string).unwrap(),
        "invalid version range: cannot migrate from version 4 to version 2"
    );
}

#[test]
fn unparseable_file_is_a_storage_error() {
    let project = Project::empty();
    let path = project.file("config.json", "{ \"version\": ");
    let migrator = server_migrator().build().unwrap();

    let err = migrator.migrate(&path, 4).unwrap_err();

    assert!(matches!(err, MigratorError::Storage(_)), "{err}");
}

#[test]
fn error_hook_sees_step_failure() {
    let project = Project::empty();
    let path = project.file("config.yml", "version: 1\n");
    let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = std::sync::Arc::clone(&seen);
    let migrator = ConfigMigrator::builder()
        .register(migration(2, "explode", |_| {
            Err(MigrationError::failed("disk quota exceeded").into())
        }))
        .on_error(move |e| sink.lock().unwrap().push(e.to_string()))
        .build()
        .unwrap();

    let result = migrator.migrate(&path, 2).unwrap();

    assert!(!result.is_success());
    assert_eq!(*seen.lock().unwrap(), vec!["disk quota exceeded".to_string()]);
}
