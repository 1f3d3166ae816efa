//! # sform CLI
//!
//! Entry point for the `sform` binary. Parses arguments, loads
//! `sform.yaml`, installs logging and dispatches to the subcommand
//! handlers in the library crate.

use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use sform_cli::config::{GlobalArgs, SformConfig};
use sform_cli::data::{run_check, run_init, CheckArgs, InitArgs};
use sform_cli::fields::{run_fields, run_flatten, FieldsArgs, FlattenArgs};
use sform_cli::lint::{run_docs, run_lint, DocsArgs, LintArgs};
use sform_cli::validate::{run_validate, ValidateArgs};

/// Work with JSON Schema form definitions.
#[derive(Parser, Debug)]
#[command(name = "sform", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List form fields with type, $ref and layout.
    Fields(FieldsArgs),
    /// Print the path-to-schema map.
    Flatten(FlattenArgs),
    /// Build initial form data from defaults and examples.
    Init(InitArgs),
    /// Check a data file against the form's field constraints.
    Check(CheckArgs),
    /// Lint one or more schemas.
    Lint(LintArgs),
    /// Render Markdown documentation for a schema.
    Docs(DocsArgs),
    /// Validate documents against a schema directory.
    Validate(ValidateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let cwd = std::env::current_dir().unwrap_or_else(|_| ".".into());
    let config = match SformConfig::discover(cli.global.config.as_deref(), &cwd) {
        Ok(config) => config.with_overrides(&cli.global),
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::from(2);
        }
    };
    config.log.init();
    tracing::debug!(?config, "configuration loaded");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = match &cli.command {
        Commands::Fields(args) => run_fields(args, &config, &mut out),
        Commands::Flatten(args) => run_flatten(args, &config, &mut out),
        Commands::Init(args) => run_init(args, &config, &mut out),
        Commands::Check(args) => run_check(args, &config, &mut out),
        Commands::Lint(args) => run_lint(args, &mut out),
        Commands::Docs(args) => run_docs(args, &mut out),
        Commands::Validate(args) => run_validate(args, &mut out),
    };
    let _ = out.flush();

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
