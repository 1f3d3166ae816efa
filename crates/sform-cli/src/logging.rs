//! # Logging Setup
//!
//! Turns a [`LogConfig`] into a `tracing-subscriber` filter and installs the
//! subscriber. Component targets named in the config are raised to
//! `component_level` while everything else stays at `level`, so a single
//! noisy area (say, traversal) can be inspected without drowning in the
//! rest. `RUST_LOG`, when set, wins over the config.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Output format of log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Log levels per component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level for everything not listed in `components`.
    pub level: String,
    /// Targets logged at `component_level`. Short names (`traverse`,
    /// `resolve`) expand to `sform_schema::<name>`.
    pub components: Vec<String>,
    pub component_level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            components: Vec::new(),
            component_level: "debug".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LogConfig {
    /// `EnvFilter` directives, e.g. `warn,sform_schema::traverse=debug`.
    pub fn directives(&self) -> String {
        let mut directives = vec![self.level.clone()];
        for component in &self.components {
            let target = if component.contains("::") {
                component.clone()
            } else {
                format!("sform_schema::{component}")
            };
            directives.push(format!("{target}={}", self.component_level));
        }
        directives.join(",")
    }

    /// Install the global subscriber. Logs go to stderr; stdout carries
    /// command output only.
    pub fn init(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.directives()));

        match self.format {
            LogFormat::Text => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init(),
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives() {
        assert_eq!(LogConfig::default().directives(), "warn");
    }

    #[test]
    fn component_directives() {
        let config = LogConfig {
            level: "info".into(),
            components: vec!["traverse".into(), "sform_cli::fields".into()],
            component_level: "trace".into(),
            format: LogFormat::Json,
        };
        assert_eq!(
            config.directives(),
            "info,sform_schema::traverse=trace,sform_cli::fields=trace"
        );
    }

    #[test]
    fn directives_parse_as_filter() {
        let config = LogConfig {
            components: vec!["resolve".into()],
            ..LogConfig::default()
        };
        assert!(EnvFilter::try_new(config.directives()).is_ok());
    }

    #[test]
    fn deserializes_partial_yaml() {
        let config: LogConfig =
            serde_yaml::from_str("components: [traverse]\nformat: json\n").unwrap();
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.components, vec!["traverse"]);
    }
}
