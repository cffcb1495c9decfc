//! Backup specs
//!
//! Verify backups are verbatim copies taken only when a file is migrated.

use crate::prelude::*;

#[test]
fn fixed_suffix_backup_holds_original_bytes() {
    let project = Project::empty();
    let original = format!("# managed by ops\n{SERVER_V1_YAML}");
    let path = project.file("config.yml", &original);
    let migrator = server_migrator().create_backups(true).build().unwrap();

    migrator.migrate(&path, SERVER_VERSION).unwrap();

    project.assert_file("config.yml.bak", &original);
    project.assert_file("config.yml", SERVER_V4_YAML);
}

#[test]
fn fixed_suffix_backup_is_overwritten_each_run() {
    let project = Project::empty();
    let migrator = server_migrator()
        .create_backups(true)
        .backup_suffix(".old")
        .build()
        .unwrap();

    let path = project.file("config.yml", "version: 1\nhost: first\n");
    migrator.migrate(&path, 3).unwrap();
    project.file("config.yml", "version: 2\nhost: second\ntimeout: 1\n");
    migrator.migrate(&path, 3).unwrap();

    project.assert_file("config.yml.old", "version: 2\nhost: second\ntimeout: 1\n");
    assert_eq!(project.files(), vec!["config.yml", "config.yml.old"]);
}

#[test]
fn timestamped_backups_are_never_overwritten() {
    let project = Project::empty();
    let migrator = server_migrator()
        .backups(BackupConfig {
            enabled: true,
            timestamped: true,
            ..BackupConfig::default()
        })
        .build()
        .unwrap();

    for host in ["a", "b", "c"] {
        let path = project.file("server.yml", &format!("version: 2\nhost: {host}\n"));
        migrator.migrate(&path, 3).unwrap();
    }

    let backups: Vec<String> = project
        .files()
        .into_iter()
        .filter(|name| name != "server.yml")
        .collect();
    assert_eq!(backups.len(), 3, "{backups:?}");
    let mut hosts: Vec<String> = backups
        .iter()
        .map(|name| {
            assert!(name.starts_with("server-") && name.ends_with(".yml.bak"), "{name}");
            project.read(name)
        })
        .collect();
    hosts.sort();
    assert_eq!(
        hosts,
        vec![
            "version: 2\nhost: a\n",
            "version: 2\nhost: b\n",
            "version: 2\nhost: c\n"
        ]
    );
}

#[test]
fn no_backup_for_fresh_or_current_files() {
    let project = Project::empty();
    let migrator = server_migrator().create_backups(true).build().unwrap();

    migrator.migrate(&project.join("fresh.yml"), 4).unwrap();
    let current = project.file("current.yml", "version: 4\n");
    migrator.migrate(&current, 4).unwrap();

    assert_eq!(project.files(), vec!["current.yml", "fresh.yml"]);
}

#[test]
fn backup_is_kept_when_migration_fails() {
    let project = Project::empty();
    let path = project.file("config.yml", "version: 3\ndbUser: u\ndatabase: not-a-map\n");
    let migrator = server_migrator().create_backups(true).build().unwrap();

    let result = migrator.migrate(&path, 4).unwrap();

    assert!(!result.is_success());
    project.assert_file("config.yml.bak", "version: 3\ndbUser: u\ndatabase: not-a-map\n");
    project.assert_file("config.yml", "version: 3\ndbUser: u\ndatabase: not-a-map\n");
}

#[test]
fn backup_failure_aborts_migration() {
    let project = Project::empty();
    let path = project.file("config.yml", SERVER_V1_YAML);
    // A directory squatting on the backup name makes the copy fail
    std::fs::create_dir(project.join("config.yml.bak")).unwrap();
    let migrator = server_migrator().create_backups(true).build().unwrap();

    let err = migrator.migrate(&path, SERVER_VERSION).unwrap_err();

    assert!(matches!(err, MigratorError::Backup { .. }), "{err}");
    project.assert_file("config.yml", SERVER_V1_YAML);
}
