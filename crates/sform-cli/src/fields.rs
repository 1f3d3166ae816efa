//! # Field Listing and Flattening
//!
//! `sform fields` walks a schema with the configured traversal options and
//! reports one row per field: its dotted path, type, the `$ref` it came
//! through and the layout rule that applies. `sform flatten` prints the
//! path-to-node map built by [`sform_schema::flatten_schema`].

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use serde_json::Value;

use sform_core::{field_name, parent_path};
use sform_schema::{
    get_root_columns, CircularRef, FieldPathResolver, SchemaWalker, VisitContext,
};

use crate::config::SformConfig;
use crate::load_file;

/// Arguments for `sform fields`.
#[derive(Args, Debug)]
pub struct FieldsArgs {
    /// Schema file (JSON or YAML).
    pub schema: PathBuf,

    /// Print rows as a JSON array.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `sform flatten`.
#[derive(Args, Debug)]
pub struct FlattenArgs {
    /// Schema file (JSON or YAML).
    pub schema: PathBuf,

    /// Print only the paths, one per line.
    #[arg(long)]
    pub paths_only: bool,
}

/// One field of the form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRow {
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,
    /// Field path of the matching layout rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    pub columns: u32,
    pub span: u32,
}

/// Rows for every non-root node, plus the references cut as circular.
pub fn collect_fields(schema: &Value, config: &SformConfig) -> (Vec<FieldRow>, Vec<CircularRef>) {
    let mut resolver = FieldPathResolver::new();
    let mut rows = Vec::new();

    let mut walker = SchemaWalker::new(schema, config.traversal);
    walker.walk(|ctx: &VisitContext<'_>| {
        if ctx.is_root() {
            return;
        }
        let dotted = ctx.dotted_path();
        let key = field_name(Some(&dotted)).to_string();
        let parent = parent_path(&dotted);

        let info = resolver.resolve_field_path(&key, parent, ctx.raw_schema(), schema);
        let rule = resolver.find_layout_config(&info, &config.layout);

        rows.push(FieldRow {
            path: dotted,
            name: key,
            schema_type: ctx.schema_type().as_str().to_string(),
            ref_path: info.ref_path,
            layout: rule.and_then(|r| r.field_path.clone()),
            columns: rule.map_or(config.default_columns, |r| r.columns),
            span: rule.and_then(|r| r.span).unwrap_or(1),
        });
    });

    (rows, walker.circular_refs().to_vec())
}

/// Run `sform fields`.
pub fn run_fields(args: &FieldsArgs, config: &SformConfig, out: &mut dyn Write) -> Result<u8> {
    let schema = load_file(&args.schema)?;
    let (rows, circular) = collect_fields(&schema, config);

    tracing::debug!(fields = rows.len(), circular = circular.len(), "fields collected");

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&rows)?)?;
        return Ok(0);
    }

    writeln!(
        out,
        "root columns: {}",
        get_root_columns(&config.layout, config.default_columns)
    )?;
    for row in &rows {
        let via = row
            .ref_path
            .as_deref()
            .map(|r| format!("  via {r}"))
            .unwrap_or_default();
        writeln!(
            out,
            "{:<40} {:<8} cols={} span={}{}",
            row.path, row.schema_type, row.columns, row.span, via
        )?;
    }
    if !circular.is_empty() {
        writeln!(out, "{} circular reference(s) not expanded", circular.len())?;
    }
    Ok(0)
}

/// Run `sform flatten`.
pub fn run_flatten(args: &FlattenArgs, config: &SformConfig, out: &mut dyn Write) -> Result<u8> {
    let schema = load_file(&args.schema)?;
    let flat = sform_schema::flatten_schema(&schema, None, config.traversal.max_depth);

    if args.paths_only {
        for path in flat.keys() {
            writeln!(out, "{path}")?;
        }
    } else {
        writeln!(out, "{}", serde_json::to_string_pretty(&flat)?)?;
    }
    Ok(0)
}
