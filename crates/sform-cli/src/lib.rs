//! # sform-cli: Command Line for sform Schemas
//!
//! The `sform` binary works on JSON and YAML form schemas from the shell:
//!
//! - `sform fields <schema>`: every field path with its type, `$ref`
//!   provenance and layout columns.
//! - `sform flatten <schema>`: the path-to-node map as JSON.
//! - `sform init <schema>`: initial form data from defaults and examples.
//! - `sform check <schema> <data>`: inline field checks on a data file.
//! - `sform lint <schema>...`: schema lint, `$ref` and `$id` checks, cycles.
//! - `sform docs <schema>`: Markdown documentation.
//! - `sform validate --schemas <dir> --schema <name> <doc>...`: full JSON
//!   Schema validation through a schema registry.
//!
//! ## Crate Policy
//!
//! - Handlers return `anyhow::Result<u8>`; the `u8` is the exit code.
//!   Findings (lint errors, failed checks) are exit code 1, not `Err`.
//! - Command output goes to the writer passed in. Logs go to stderr.
//! - Global flags override `sform.yaml`, which overrides defaults.

pub mod config;
pub mod data;
pub mod fields;
pub mod lint;
pub mod logging;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

const SCHEMA_SUFFIXES: &[&str] = &[".schema.json", ".schema.yaml", ".schema.yml"];

/// Read a JSON or YAML schema or data file.
pub fn load_file(path: &Path) -> Result<Value> {
    sform_schema::load_document(path).with_context(|| format!("cannot load {}", path.display()))
}

/// Name of a schema file: `person.schema.yaml` is `person`, `person.json`
/// is `person`.
pub fn schema_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    for suffix in SCHEMA_SUFFIXES {
        if let Some(name) = file_name.strip_suffix(suffix) {
            return name.to_string();
        }
    }
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_name_strips_schema_suffix() {
        assert_eq!(schema_name(Path::new("dir/person.schema.yaml")), "person");
        assert_eq!(schema_name(Path::new("order.schema.json")), "order");
        assert_eq!(schema_name(Path::new("plain.json")), "plain");
        assert_eq!(schema_name(Path::new("noext")), "noext");
    }

    #[test]
    fn load_file_reports_path() {
        let err = load_file(Path::new("/nonexistent/form.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/form.json"));
    }
}
