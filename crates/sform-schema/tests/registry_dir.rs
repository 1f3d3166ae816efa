//! Integration test: load a schema directory from disk, lint it as a
//! registry and validate JSON and YAML documents against it.

use std::fs;
use std::path::Path;

use serde_json::json;
use sform_schema::{lint_registry, load_document, LintCode, SchemaError, SchemaRegistry};

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn fixture_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "contact.schema.json",
        &json!({
            "$id": "https://forms.example/contact.schema.json",
            "type": "object",
            "required": ["email"],
            "properties": {
                "email": {"type": "string", "format": "email"},
                "phone": {"type": "string", "pattern": "^[0-9+ ]+$"}
            }
        })
        .to_string(),
    );
    write(
        dir.path(),
        "employee.schema.yaml",
        r##"
type: object
required: [name, contact]
properties:
  name:
    type: string
    minLength: 1
  contact:
    $ref: https://forms.example/contact.schema.json
  manager:
    $ref: "#/$defs/Employee"
$defs:
  Employee:
    type: object
    properties:
      name:
        type: string
      reports:
        type: array
        items:
          $ref: "#/$defs/Employee"
"##,
    );
    write(dir.path(), "notes.txt", "not a schema");
    dir
}

#[test]
fn loads_only_schema_files() {
    let dir = fixture_dir();
    let registry = SchemaRegistry::load_dir(dir.path()).unwrap();
    assert_eq!(registry.list(), vec!["contact", "employee"]);
    assert_eq!(registry.get("employee").unwrap()["required"], json!(["name", "contact"]));
}

#[test]
fn validates_documents_across_schemas() {
    let dir = fixture_dir();
    let registry = SchemaRegistry::load_dir(dir.path()).unwrap();

    registry
        .validate_document(
            &json!({"name": "Grace", "contact": {"email": "grace@example.com"}}),
            "employee",
        )
        .unwrap();

    let err = registry
        .validate_document(&json!({"name": "Grace", "contact": {}}), "employee")
        .unwrap_err();
    match err {
        SchemaError::ValidationFailed { violations, .. } => {
            assert_eq!(violations.violations()[0].instance_path, "/contact");
        }
        other => panic!("expected ValidationFailed, got: {other}"),
    }
}

#[test]
fn rejects_document_missing_required_property() {
    let dir = fixture_dir();
    let registry = SchemaRegistry::load_dir(dir.path()).unwrap();
    let doc_path = dir.path().join("employee.yaml");
    fs::write(&doc_path, "contact:\n  email: a@b.c\n").unwrap();

    let err = registry.validate_file(&doc_path, "employee").unwrap_err();
    match err {
        SchemaError::ValidationFailed { schema_name, violations } => {
            assert_eq!(schema_name, "employee");
            assert!(violations.violations().iter().any(|v| v.message.contains("name")));
        }
        other => panic!("expected ValidationFailed, got: {other}"),
    }
}

#[test]
fn registry_lint_flags_definition_cycle() {
    let dir = fixture_dir();
    let registry = SchemaRegistry::load_dir(dir.path()).unwrap();
    let report = lint_registry(registry.iter());

    assert!(report.is_valid(), "{:?}", report.errors);
    let cycles: Vec<_> = report
        .warnings
        .iter()
        .filter(|w| w.code == LintCode::CircularReference)
        .collect();
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].path, "employee");
}

#[test]
fn broken_schema_file_fails_loading() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "bad.schema.json", "{ not json");
    let err = SchemaRegistry::load_dir(dir.path()).unwrap_err();
    assert!(matches!(err, SchemaError::SchemaLoad { ref schema_name, .. } if schema_name == "bad.schema.json"));
}

#[test]
fn missing_directory_fails_loading() {
    let dir = tempfile::tempdir().unwrap();
    let err = SchemaRegistry::load_dir(dir.path().join("absent")).unwrap_err();
    assert!(matches!(err, SchemaError::SchemaLoad { .. }));
}

#[test]
fn load_document_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("data.json");
    let yaml_path = dir.path().join("data.yml");
    fs::write(&json_path, r#"{"a": [1, 2]}"#).unwrap();
    fs::write(&yaml_path, "a:\n  - 1\n  - 2\n").unwrap();

    assert_eq!(load_document(&json_path).unwrap(), load_document(&yaml_path).unwrap());
    assert!(matches!(
        load_document(&dir.path().join("nope.json")),
        Err(SchemaError::DocumentLoad { .. })
    ));
}
