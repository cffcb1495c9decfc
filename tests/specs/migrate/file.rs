//! File migration specs
//!
//! Verify what `ConfigMigrator::migrate` leaves on disk.

use crate::prelude::*;

#[test]
fn migrates_v1_file_to_current_version() {
    let project = Project::empty();
    let path = project.file("config.yml", SERVER_V1_YAML);
    let migrator = server_migrator().build().unwrap();

    let result = migrator.migrate(&path, SERVER_VERSION).unwrap();

    assert!(result.is_success(), "{result}");
    assert_eq!(result.from_version(), 1);
    assert_eq!(result.to_version(), 4);
    let descriptions: Vec<_> = result.steps().iter().map(|s| s.description.as_str()).collect();
    assert_eq!(
        descriptions,
        vec!["Add timeout", "Rename host to hostname", "Group database settings"]
    );
    project.assert_file("config.yml", SERVER_V4_YAML);
}

#[test]
fn migrates_from_intermediate_version() {
    let project = Project::empty();
    let path = project.file(
        "config.yml",
        "version: 3\nhostname: a\ntimeout: 5\ndbUser: u\ndbPassword: p\n",
    );
    let migrator = server_migrator().build().unwrap();

    let result = migrator.migrate(&path, SERVER_VERSION).unwrap();

    assert_eq!(result.steps().len(), 1);
    project.assert_file(
        "config.yml",
        "version: 4\nhostname: a\ntimeout: 5\ndatabase:\n  user: u\n  password: p\n",
    );
}

#[test]
fn current_file_is_left_byte_for_byte() {
    let project = Project::empty();
    let original = "# hand-written comment\nversion: 4\nhostname: x\n";
    let path = project.file("config.yml", original);
    let migrator = server_migrator().create_backups(true).build().unwrap();

    let result = migrator.migrate(&path, SERVER_VERSION).unwrap();

    assert!(result.is_noop());
    project.assert_file("config.yml", original);
    assert_eq!(project.files(), vec!["config.yml"]);
}

#[test]
fn missing_file_is_created_at_target_version() {
    let project = Project::empty();
    let migrator = server_migrator().build().unwrap();

    let result = migrator.migrate(&project.join("conf/new.yml"), 3).unwrap();

    assert!(result.is_success());
    assert!(result.steps().is_empty());
    assert_eq!(result.to_version(), 3);
    project.assert_file("conf/new.yml", "version: 3\n");
}

#[test]
fn empty_file_is_stamped() {
    let project = Project::empty();
    let path = project.file("config.yml", "");
    let migrator = server_migrator().build().unwrap();

    migrator.migrate(&path, 3).unwrap();

    project.assert_file("config.yml", "version: 3\n");
}

#[test]
fn unversioned_file_starts_at_zero() {
    let project = Project::empty();
    let path = project.file("legacy.yml", "host: old\n");
    let migrator = server_migrator().strict(false).build().unwrap();

    assert_eq!(migrator.get_version(&path).unwrap(), Some(0));
    assert!(migrator.needs_migration(&path, 3).unwrap());
    let result = migrator.migrate(&path, 3).unwrap();

    assert!(result.is_success());
    project.assert_file("legacy.yml", "hostname: old\ntimeout: 30\nversion: 3\n");
}

#[test]
fn probes_do_not_touch_the_file() {
    let project = Project::empty();
    let path = project.file("config.yml", SERVER_V1_YAML);
    let migrator = server_migrator().build().unwrap();

    assert_eq!(migrator.get_version(&path).unwrap(), Some(1));
    assert!(migrator.needs_migration(&path, SERVER_VERSION).unwrap());
    assert_eq!(migrator.get_version(&project.join("nope.yml")).unwrap(), None);
    assert!(!migrator.needs_migration(&project.join("nope.yml"), SERVER_VERSION).unwrap());
    project.assert_file("config.yml", SERVER_V1_YAML);
}

#[test]
fn dry_run_reports_but_never_writes() {
    let project = Project::empty();
    let path = project.file("config.yml", SERVER_V1_YAML);
    let migrator = server_migrator()
        .dry_run(true)
        .create_backups(true)
        .build()
        .unwrap();

    let result = migrator.migrate(&path, SERVER_VERSION).unwrap();

    assert!(result.is_success());
    assert_eq!(result.to_version(), SERVER_VERSION);
    assert_eq!(
        Format::Yaml.render(result.document()).unwrap(),
        SERVER_V4_YAML
    );
    project.assert_file("config.yml", SERVER_V1_YAML);
    assert_eq!(project.files(), vec!["config.yml"]);
}
