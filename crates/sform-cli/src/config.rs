//! # CLI Configuration
//!
//! `sform.yaml` holds traversal defaults, the layout table and logging
//! settings. The file is optional: `--config` names it explicitly,
//! otherwise `sform.yaml` in the working directory is used when present,
//! otherwise built-in defaults apply. Global flags override file values.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};

use sform_schema::{FieldLayoutConfig, TraversalOptions};

use crate::logging::{LogConfig, LogFormat};

/// File looked up in the working directory without `--config`.
pub const DEFAULT_CONFIG_FILE: &str = "sform.yaml";

/// Contents of `sform.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SformConfig {
    pub traversal: TraversalOptions,
    /// Layout rules applied by `sform fields`.
    pub layout: Vec<FieldLayoutConfig>,
    /// Columns when no layout rule matches.
    pub default_columns: u32,
    pub log: LogConfig,
}

impl Default for SformConfig {
    fn default() -> Self {
        Self {
            traversal: TraversalOptions::default(),
            layout: Vec::new(),
            default_columns: 1,
            log: LogConfig::default(),
        }
    }
}

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Path to the configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log output format.
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    /// Traversal depth budget.
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,

    /// Do not expand `$ref` pointers.
    #[arg(long, global = true)]
    pub no_refs: bool,

    /// Raise the log level. Repeat for more (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl SformConfig {
    /// Parse a YAML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// The explicit file, else `sform.yaml` in `dir` if present, else
    /// defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, global: &GlobalArgs) -> Self {
        if let Some(depth) = global.max_depth {
            self.traversal.max_depth = depth;
        }
        if global.no_refs {
            self.traversal.resolve_refs = false;
        }
        if let Some(format) = global.log_format {
            self.log.format = format;
        }
        match global.verbose {
            0 => {}
            1 => self.log.level = "info".to_string(),
            2 => self.log.level = "debug".to_string(),
            _ => self.log.level = "trace".to_string(),
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sform_schema::ArrayItemsMode;

    const CONFIG: &str = r#"
traversal:
  max_depth: 6
  array_items: skip
layout:
  - columns: 2
  - fieldPath: user
    columns: 3
    span: 2
default_columns: 4
log:
  level: info
  components: [traverse]
"#;

    #[test]
    fn loads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yaml");
        std::fs::write(&path, CONFIG).unwrap();

        let config = SformConfig::load(&path).unwrap();
        assert_eq!(config.traversal.max_depth, 6);
        assert_eq!(config.traversal.array_items, ArrayItemsMode::Skip);
        assert!(config.traversal.resolve_refs);
        assert_eq!(config.layout.len(), 2);
        assert_eq!(config.layout[0], FieldLayoutConfig::root(2));
        assert_eq!(config.layout[1], FieldLayoutConfig::field("user", 3).with_span(2));
        assert_eq!(config.default_columns, 4);
        assert_eq!(config.log.directives(), "info,sform_schema::traverse=debug");
    }

    #[test]
    fn discover_prefers_explicit_then_cwd_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(SformConfig::discover(None, dir.path()).unwrap(), SformConfig::default());

        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "default_columns: 3\n").unwrap();
        assert_eq!(SformConfig::discover(None, dir.path()).unwrap().default_columns, 3);

        let explicit = dir.path().join("other.yaml");
        std::fs::write(&explicit, "default_columns: 5\n").unwrap();
        let config = SformConfig::discover(Some(&explicit), dir.path()).unwrap();
        assert_eq!(config.default_columns, 5);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SformConfig::discover(Some(&dir.path().join("absent.yaml")), dir.path())
            .unwrap_err();
        assert!(err.to_string().contains("cannot read config file"));
    }

    #[test]
    fn overrides_win() {
        let global = GlobalArgs {
            max_depth: Some(3),
            no_refs: true,
            log_format: Some(LogFormat::Json),
            verbose: 2,
            ..GlobalArgs::default()
        };
        let config = SformConfig::default().with_overrides(&global);
        assert_eq!(config.traversal.max_depth, 3);
        assert!(!config.traversal.resolve_refs);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.level, "debug");
    }
}
