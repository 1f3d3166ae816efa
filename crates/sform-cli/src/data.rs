//! `sform init` and `sform check`: initial form data and inline field
//! checks.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use sform_schema::{initialize_data, validate_data};

use crate::config::SformConfig;
use crate::load_file;

/// Arguments for `sform init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Schema file (JSON or YAML).
    pub schema: PathBuf,

    /// Write the data here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for `sform check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema file (JSON or YAML).
    pub schema: PathBuf,

    /// Data file (JSON or YAML).
    pub data: PathBuf,

    /// Print violations as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Run `sform init`.
pub fn run_init(args: &InitArgs, config: &SformConfig, out: &mut dyn Write) -> Result<u8> {
    let schema = load_file(&args.schema)?;
    let data = initialize_data(&schema, None, config.traversal.max_depth);
    let rendered = serde_json::to_string_pretty(&data)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, format!("{rendered}\n"))
                .with_context(|| format!("cannot write {}", path.display()))?;
            tracing::info!(path = %path.display(), "initial data written");
        }
        None => writeln!(out, "{rendered}")?,
    }
    Ok(0)
}

/// Run `sform check`. Exit code 1 when any check fails.
pub fn run_check(args: &CheckArgs, config: &SformConfig, out: &mut dyn Write) -> Result<u8> {
    let schema = load_file(&args.schema)?;
    let data = load_file(&args.data)?;
    let report = validate_data(&data, &schema, None, config.traversal.max_depth);

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else if report.is_valid() {
        writeln!(out, "OK: {}", args.data.display())?;
    } else {
        for violation in &report.violations {
            writeln!(out, "{}: {}", args.data.display(), violation)?;
        }
    }

    Ok(if report.is_valid() { 0 } else { 1 })
}
