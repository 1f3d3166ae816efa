//! `sform validate`: full JSON Schema validation of documents against a
//! schema directory.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use sform_schema::{SchemaError, SchemaRegistry};

/// Arguments for `sform validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Directory of `*.schema.json` / `*.schema.yaml` files.
    #[arg(long)]
    pub schemas: PathBuf,

    /// Registry name of the schema to validate against.
    #[arg(long)]
    pub schema: String,

    /// Documents to validate (JSON or YAML).
    #[arg(required = true)]
    pub documents: Vec<PathBuf>,
}

/// Run `sform validate`. Exit code 1 when any document fails.
pub fn run_validate(args: &ValidateArgs, out: &mut dyn Write) -> Result<u8> {
    let registry = SchemaRegistry::load_dir(&args.schemas)
        .with_context(|| format!("cannot load schemas from {}", args.schemas.display()))?;
    if registry.get(&args.schema).is_none() {
        anyhow::bail!(
            "schema '{}' not found in {} (available: {})",
            args.schema,
            args.schemas.display(),
            registry.list().join(", ")
        );
    }

    let mut failed = 0usize;
    for document in &args.documents {
        match registry.validate_file(document, &args.schema) {
            Ok(()) => writeln!(out, "OK: {}", document.display())?,
            Err(SchemaError::ValidationFailed { violations, .. }) => {
                failed += 1;
                writeln!(out, "FAIL: {}", document.display())?;
                for violation in violations.violations() {
                    writeln!(out, "{violation}")?;
                }
            }
            Err(e) => return Err(e).with_context(|| format!("cannot validate {}", document.display())),
        }
    }

    tracing::info!(
        documents = args.documents.len(),
        failed,
        schema = %args.schema,
        "validation finished"
    );
    Ok(u8::from(failed > 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn setup() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("schemas")).unwrap();
        std::fs::write(
            dir.path().join("schemas/ticket.schema.json"),
            json!({
                "type": "object",
                "required": ["title"],
                "properties": {
                    "title": {"type": "string"},
                    "priority": {"enum": ["low", "high"]}
                }
            })
            .to_string(),
        )
        .unwrap();
        std::fs::write(dir.path().join("ok.yaml"), "title: Broken login\npriority: high\n").unwrap();
        std::fs::write(dir.path().join("bad.json"), r#"{"priority": "urgent"}"#).unwrap();
        dir
    }

    #[test]
    fn reports_each_document() {
        let dir = setup();
        let args = ValidateArgs {
            schemas: dir.path().join("schemas"),
            schema: "ticket".into(),
            documents: vec![dir.path().join("ok.yaml"), dir.path().join("bad.json")],
        };
        let mut out = Vec::new();
        assert_eq!(run_validate(&args, &mut out).unwrap(), 1);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("OK: "));
        assert!(text.contains("FAIL: "));
        assert!(text.contains("title"));

        // Violation lines carry a single two-space indent.
        let detail: Vec<&str> = text
            .lines()
            .filter(|l| !l.starts_with("OK") && !l.starts_with("FAIL"))
            .collect();
        assert!(!detail.is_empty());
        assert!(
            detail.iter().all(|l| l.starts_with("  ") && !l.starts_with("   ")),
            "{text}"
        );
    }

    #[test]
    fn all_valid_exits_zero() {
        let dir = setup();
        let args = ValidateArgs {
            schemas: dir.path().join("schemas"),
            schema: "ticket".into(),
            documents: vec![dir.path().join("ok.yaml")],
        };
        assert_eq!(run_validate(&args, &mut Vec::new()).unwrap(), 0);
    }

    #[test]
    fn unknown_schema_lists_available() {
        let dir = setup();
        let args = ValidateArgs {
            schemas: dir.path().join("schemas"),
            schema: "invoice".into(),
            documents: vec![dir.path().join("ok.yaml")],
        };
        let err = run_validate(&args, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("available: ticket"));
    }

    #[test]
    fn unreadable_document_is_an_error() {
        let dir = setup();
        let args = ValidateArgs {
            schemas: dir.path().join("schemas"),
            schema: "ticket".into(),
            documents: vec![dir.path().join("missing.json")],
        };
        assert!(run_validate(&args, &mut Vec::new()).is_err());
    }
}
