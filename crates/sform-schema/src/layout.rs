//! # Field Layout Configuration
//!
//! Grid layout rules for rendered forms. Each entry names a field path
//! (absent for the form root), how many columns that field's children are
//! laid out in, and optionally how many grid columns the field itself spans.

use serde::{Deserialize, Serialize};

/// One layout rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLayoutConfig {
    /// Dotted field path, or `None` for the root container.
    #[serde(default, alias = "fieldPath", skip_serializing_if = "Option::is_none")]
    pub field_path: Option<String>,
    /// Columns for the sub-fields of this field.
    pub columns: u32,
    /// Grid columns this field spans.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<u32>,
}

impl FieldLayoutConfig {
    pub fn root(columns: u32) -> Self {
        Self {
            field_path: None,
            columns,
            span: None,
        }
    }

    pub fn field(path: impl Into<String>, columns: u32) -> Self {
        Self {
            field_path: Some(path.into()),
            columns,
            span: None,
        }
    }

    pub fn with_span(mut self, span: u32) -> Self {
        self.span = Some(span);
        self
    }
}

/// The rule whose path is exactly `field_path`.
pub fn get_field_layout<'c>(
    field_path: &str,
    configs: &'c [FieldLayoutConfig],
) -> Option<&'c FieldLayoutConfig> {
    configs
        .iter()
        .find(|c| c.field_path.as_deref() == Some(field_path))
}

/// The root rule (no path).
pub fn get_root_layout(configs: &[FieldLayoutConfig]) -> Option<&FieldLayoutConfig> {
    configs.iter().find(|c| c.field_path.is_none())
}

/// Columns for a field's children, or `default_columns` without a rule.
pub fn get_field_columns(field_path: &str, configs: &[FieldLayoutConfig], default_columns: u32) -> u32 {
    get_field_layout(field_path, configs)
        .map(|c| c.columns)
        .unwrap_or(default_columns)
}

/// Grid span of a field; 1 without a rule or span.
pub fn get_field_span(field_path: &str, configs: &[FieldLayoutConfig]) -> u32 {
    get_field_layout(field_path, configs)
        .and_then(|c| c.span)
        .unwrap_or(1)
}

/// Columns of the root container, or `default_columns` without a root rule.
pub fn get_root_columns(configs: &[FieldLayoutConfig], default_columns: u32) -> u32 {
    get_root_layout(configs)
        .map(|c| c.columns)
        .unwrap_or(default_columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configs() -> Vec<FieldLayoutConfig> {
        vec![
            FieldLayoutConfig::root(2),
            FieldLayoutConfig::field("user", 3).with_span(2),
            FieldLayoutConfig::field("settings.notifications", 1),
        ]
    }

    #[test]
    fn field_layout_exact_match() {
        let configs = configs();
        assert_eq!(get_field_layout("user", &configs).map(|c| c.columns), Some(3));
        assert!(get_field_layout("user.name", &configs).is_none());
    }

    #[test]
    fn columns_and_span_defaults() {
        let configs = configs();
        assert_eq!(get_field_columns("user", &configs, 1), 3);
        assert_eq!(get_field_columns("missing", &configs, 4), 4);
        assert_eq!(get_field_span("user", &configs), 2);
        assert_eq!(get_field_span("settings.notifications", &configs), 1);
        assert_eq!(get_field_span("missing", &configs), 1);
    }

    #[test]
    fn root_columns() {
        assert_eq!(get_root_columns(&configs(), 1), 2);
        assert_eq!(get_root_columns(&[], 1), 1);
    }

    #[test]
    fn deserializes_camel_case_path() {
        let config: FieldLayoutConfig =
            serde_json::from_str(r#"{"fieldPath": "user", "columns": 2}"#).unwrap();
        assert_eq!(config, FieldLayoutConfig::field("user", 2));
        let root: FieldLayoutConfig = serde_json::from_str(r#"{"columns": 3}"#).unwrap();
        assert_eq!(root, FieldLayoutConfig::root(3));
    }
}
