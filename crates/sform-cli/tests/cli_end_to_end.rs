//! Integration test: run the `sform` binary against schema and data files
//! on disk and check stdout and exit codes.

use std::path::Path;
use std::process::{Command, Output};

use serde_json::{json, Value};

fn sform(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sform"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to spawn sform")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let schema = json!({
        "title": "Shipment",
        "type": "object",
        "required": ["sender"],
        "properties": {
            "sender": {"$ref": "#/$defs/Party"},
            "recipient": {"$ref": "#/$defs/Party", "description": "Who receives it"},
            "weight": {"type": "number", "minimum": 0, "default": 1}
        },
        "$defs": {
            "Party": {
                "type": "object",
                "required": ["name"],
                "properties": {
                    "name": {"type": "string"},
                    "city": {"type": "string"}
                }
            }
        }
    });
    std::fs::write(dir.path().join("shipment.schema.json"), schema.to_string()).unwrap();
    dir
}

#[test]
fn fields_uses_config_file_layout() {
    let dir = fixture();
    std::fs::write(
        dir.path().join("sform.yaml"),
        "layout:\n  - columns: 2\n  - fieldPath: sender\n    columns: 3\n",
    )
    .unwrap();

    let output = sform(dir.path(), &["fields", "shipment.schema.json", "--json"]);
    assert!(output.status.success());
    let rows: Value = serde_json::from_str(&stdout(&output)).unwrap();
    let paths: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["path"].as_str().unwrap())
        .collect();
    assert_eq!(
        paths,
        vec![
            "sender",
            "sender.name",
            "sender.city",
            "recipient",
            "recipient.name",
            "recipient.city",
            "weight"
        ]
    );
    assert_eq!(rows[0]["columns"], 3);
    assert_eq!(rows[1]["columns"], 3);
    assert_eq!(rows[3]["ref_path"], "#/$defs/Party");

    let table = sform(dir.path(), &["fields", "shipment.schema.json"]);
    assert!(stdout(&table).starts_with("root columns: 2"));
}

#[test]
fn no_refs_flag_stops_expansion() {
    let dir = fixture();
    let output = sform(dir.path(), &["--no-refs", "fields", "shipment.schema.json", "--json"]);
    assert!(output.status.success());
    let rows: Value = serde_json::from_str(&stdout(&output)).unwrap();
    let paths: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["sender", "recipient", "weight"]);

    let flat = sform(dir.path(), &["flatten", "shipment.schema.json", "--paths-only"]);
    assert!(stdout(&flat).lines().any(|line| line == "recipient.city"));
}

#[test]
fn init_then_check_round_trip() {
    let dir = fixture();
    let init = sform(dir.path(), &["init", "shipment.schema.json", "-o", "data.json"]);
    assert!(init.status.success());

    let data: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("data.json")).unwrap())
            .unwrap();
    assert_eq!(data["weight"], 1);
    assert_eq!(data["sender"], json!({"name": "", "city": ""}));

    // Initial data leaves required names blank.
    let check = sform(dir.path(), &["check", "shipment.schema.json", "data.json"]);
    assert_eq!(check.status.code(), Some(1));
    assert!(stdout(&check).contains("Field 'sender.name' is required"));
}

#[test]
fn lint_and_docs() {
    let dir = fixture();
    let lint = sform(dir.path(), &["lint", "shipment.schema.json"]);
    assert!(lint.status.success(), "{}", stdout(&lint));

    let docs = sform(dir.path(), &["docs", "shipment.schema.json"]);
    assert!(docs.status.success());
    let markdown = stdout(&docs);
    assert!(markdown.starts_with("# Shipment\n"));
    assert!(markdown.contains("Who receives it"));
}

#[test]
fn validate_against_schema_directory() {
    let dir = fixture();
    std::fs::write(dir.path().join("ok.yaml"), "sender:\n  name: Ada\nweight: 2\n").unwrap();
    std::fs::write(dir.path().join("bad.json"), r#"{"weight": -1}"#).unwrap();

    let ok = sform(dir.path(), &["validate", "--schemas", ".", "--schema", "shipment", "ok.yaml"]);
    assert!(ok.status.success(), "{}", stdout(&ok));

    let bad = sform(dir.path(), &["validate", "--schemas", ".", "--schema", "shipment", "bad.json"]);
    assert_eq!(bad.status.code(), Some(1));
    assert!(stdout(&bad).starts_with("FAIL: bad.json"));
}

#[test]
fn broken_config_file_exits_two() {
    let dir = fixture();
    std::fs::write(dir.path().join("sform.yaml"), "default_columns: [oops\n").unwrap();
    let output = sform(dir.path(), &["fields", "shipment.schema.json"]);
    assert_eq!(output.status.code(), Some(2));
}
