//! `sform lint` and `sform docs`.
//!
//! Lint runs over every schema named on the command line as one registry,
//! so duplicate `$id`s and unresolved local `$ref`s are reported alongside
//! the per-schema checks.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::Value;

use sform_schema::{generate_documentation, lint_registry};

use crate::{load_file, schema_name};

/// Arguments for `sform lint`.
#[derive(Args, Debug)]
pub struct LintArgs {
    /// Schema files (JSON or YAML).
    #[arg(required = true)]
    pub schemas: Vec<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `sform docs`.
#[derive(Args, Debug)]
pub struct DocsArgs {
    /// Schema file (JSON or YAML).
    pub schema: PathBuf,

    /// Document heading. Defaults to the schema `title`, then the file name.
    #[arg(long)]
    pub name: Option<String>,

    /// Write Markdown here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Run `sform lint`. Exit code 1 on errors, or on warnings with `--strict`.
pub fn run_lint(args: &LintArgs, out: &mut dyn Write) -> Result<u8> {
    let mut schemas: Vec<(String, Value)> = Vec::with_capacity(args.schemas.len());
    for path in &args.schemas {
        let name = schema_name(path);
        if schemas.iter().any(|(existing, _)| *existing == name) {
            bail!("two schemas named '{name}' (from {})", path.display());
        }
        schemas.push((name, load_file(path)?));
    }

    let report = lint_registry(schemas.iter().map(|(name, schema)| (name.as_str(), schema)));
    tracing::debug!(
        schemas = schemas.len(),
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "lint finished"
    );

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        for issue in &report.errors {
            writeln!(out, "error: {issue}")?;
        }
        for issue in &report.warnings {
            writeln!(out, "warning: {issue}")?;
        }
        writeln!(
            out,
            "{} schema(s): {} error(s), {} warning(s)",
            schemas.len(),
            report.errors.len(),
            report.warnings.len()
        )?;
    }

    let failed = !report.is_valid() || (args.strict && !report.warnings.is_empty());
    Ok(u8::from(failed))
}

/// Run `sform docs`.
pub fn run_docs(args: &DocsArgs, out: &mut dyn Write) -> Result<u8> {
    let schema = load_file(&args.schema)?;
    let name = args
        .name
        .clone()
        .or_else(|| schema.get("title").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| schema_name(&args.schema));

    let markdown = generate_documentation(&schema, &name);
    match &args.output {
        Some(path) => std::fs::write(path, &markdown)
            .with_context(|| format!("cannot write {}", path.display()))?,
        None => write!(out, "{markdown}")?,
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, value.to_string()).unwrap();
        path
    }

    #[test]
    fn clean_schema_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(
            dir.path(),
            "ok.schema.json",
            &json!({"type": "object", "properties": {"a": {"type": "string"}}}),
        );
        let mut out = Vec::new();
        let args = LintArgs { schemas: vec![path], json: false, strict: true };
        assert_eq!(run_lint(&args, &mut out).unwrap(), 0);
        assert!(String::from_utf8(out).unwrap().contains("1 schema(s): 0 error(s), 0 warning(s)"));
    }

    #[test]
    fn duplicate_ids_across_files_fail() {
        let dir = tempfile::tempdir().unwrap();
        let schema = json!({"$id": "urn:same", "type": "object"});
        let a = write_json(dir.path(), "a.schema.json", &schema);
        let b = write_json(dir.path(), "b.schema.json", &schema);

        let mut out = Vec::new();
        let args = LintArgs { schemas: vec![a, b], json: true, strict: false };
        assert_eq!(run_lint(&args, &mut out).unwrap(), 1);
        let report: Value = serde_json::from_slice(&out).unwrap();
        assert!(report["errors"]
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e["code"] == "DUPLICATE_SCHEMA_ID"));
    }

    #[test]
    fn cycle_warning_fails_only_when_strict() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(
            dir.path(),
            "tree.schema.json",
            &json!({
                "type": "object",
                "properties": {"root": {"$ref": "#/$defs/Node"}},
                "$defs": {
                    "Node": {
                        "type": "object",
                        "properties": {"child": {"$ref": "#/$defs/Node"}}
                    }
                }
            }),
        );

        let lenient = LintArgs { schemas: vec![path.clone()], json: false, strict: false };
        assert_eq!(run_lint(&lenient, &mut Vec::new()).unwrap(), 0);

        let mut out = Vec::new();
        let strict = LintArgs { schemas: vec![path], json: false, strict: true };
        assert_eq!(run_lint(&strict, &mut out).unwrap(), 1);
        assert!(String::from_utf8(out).unwrap().contains("warning: [CIRCULAR_REFERENCE]"));
    }

    #[test]
    fn same_schema_name_twice_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_json(dir.path(), "x.schema.json", &json!({"type": "object"}));
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let second = write_json(&dir.path().join("sub"), "x.json", &json!({"type": "object"}));
        let args = LintArgs { schemas: vec![first, second], json: false, strict: false };
        assert!(run_lint(&args, &mut Vec::new()).is_err());
    }

    #[test]
    fn docs_heading_falls_back_to_title_then_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let titled = write_json(
            dir.path(),
            "contact.schema.json",
            &json!({"title": "Contact Form", "type": "object", "properties": {}}),
        );
        let untitled = write_json(dir.path(), "plain.schema.json", &json!({"type": "object"}));

        let mut out = Vec::new();
        run_docs(&DocsArgs { schema: titled, name: None, output: None }, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("# Contact Form\n"));

        let mut out = Vec::new();
        run_docs(&DocsArgs { schema: untitled.clone(), name: None, output: None }, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("# plain\n"));

        let target = dir.path().join("plain.md");
        let args = DocsArgs { schema: untitled, name: Some("Plain".into()), output: Some(target.clone()) };
        run_docs(&args, &mut Vec::new()).unwrap();
        assert!(std::fs::read_to_string(target).unwrap().starts_with("# Plain\n"));
    }
}
