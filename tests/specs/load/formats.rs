//! Format specs
//!
//! Verify JSON and TOML files migrate like YAML and that saved output
//! re-parses to the same structure.

use crate::prelude::*;
use cfgmig_storage::{load_from_str, save_to_string};

#[test]
fn json_file_migrates_in_place() {
    let project = Project::empty();
    let path = project.file(
        "config.json",
        r#"{"version": 1, "host": "h", "port": 1, "dbUser": "u", "dbPassword": "p"}"#,
    );
    let migrator = server_migrator().build().unwrap();

    migrator.migrate(&path, SERVER_VERSION).unwrap();

    let on_disk: serde_json::Value = serde_json::from_str(&project.read("config.json")).unwrap();
    similar_asserts::assert_eq!(
        on_disk,
        serde_json::json!({
            "version": 4,
            "hostname": "h",
            "port": 1,
            "timeout": 30,
            "database": { "user": "u", "password": "p" }
        })
    );
}

#[test]
fn toml_file_migrates_in_place() {
    let project = Project::empty();
    let path = project.file(
        "config.toml",
        "version = 1\nhost = \"h\"\ndbUser = \"u\"\ndbPassword = \"p\"\n",
    );
    let migrator = server_migrator().build().unwrap();

    let result = migrator.migrate(&path, SERVER_VERSION).unwrap();

    assert!(result.is_success(), "{result}");
    let reparsed = load_from_str(&project.read("config.toml"), Format::Toml).unwrap();
    assert_eq!(
        reparsed,
        document! {
            "version" => 4,
            "hostname" => "h",
            "timeout" => 30,
            "database" => document! { "user" => "u", "password" => "p" },
        }
    );
}

#[test]
fn yaml_round_trip_of_migrated_document() {
    let project = Project::empty();
    let path = project.file("config.yml", SERVER_V1_YAML);
    let migrator = server_migrator().dry_run(true).build().unwrap();

    let migrated = migrator
        .migrate(&path, SERVER_VERSION)
        .unwrap()
        .into_document();

    for format in [Format::Yaml, Format::Json, Format::Toml] {
        let text = save_to_string(&migrated, format).unwrap();
        assert_eq!(load_from_str(&text, format).unwrap(), migrated, "{format}");
    }
}

#[test]
fn yaml_keeps_key_order_and_nesting() {
    let doc = load_from_str(
        "zeta: 1\nalpha:\n  nested: [1, 2]\n  flag: true\nmid: ~\n",
        Format::Yaml,
    )
    .unwrap();

    let keys: Vec<_> = doc.keys().collect();
    assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    assert_eq!(doc.get("mid"), Some(&Value::Null));
    similar_asserts::assert_eq!(
        save_to_string(&doc, Format::Yaml).unwrap(),
        "zeta: 1\nalpha:\n  nested:\n  - 1\n  - 2\n  flag: true\nmid: null\n"
    );
}
