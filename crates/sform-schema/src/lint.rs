//! # Schema Lint
//!
//! Authoring checks for form schemas. These catch mistakes that a JSON
//! Schema validator accepts but that break form rendering or make a
//! constraint unsatisfiable: a node without a type, `minLength` above
//! `maxLength`, a `required` entry naming no property, a `ui.component`
//! the renderer does not know.
//!
//! Errors make a schema unusable. Warnings flag suspicious but renderable
//! input. Issue paths use the schema's own structure (`properties.user.type`,
//! `items[0].format`), prefixed with the schema name in registry mode.
//!
//! Circular `$defs` chains are warnings: traversal cuts them at the
//! re-entry point, so they render, just not infinitely.

use std::collections::{HashMap, HashSet};
use std::fmt;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use sform_core::keyword::{
    ArrayKeyword, ExtensionKeyword, NumericKeyword, ObjectKeyword, StringKeyword,
};
use sform_core::{keywords, properties, schema_id, SchemaKeyword, SchemaType};

use crate::resolve::RefPointer;

/// Formats defined by JSON Schema 2020-12.
pub const KNOWN_FORMATS: &[&str] = &[
    "date-time",
    "date",
    "time",
    "duration",
    "email",
    "idn-email",
    "hostname",
    "idn-hostname",
    "ipv4",
    "ipv6",
    "uri",
    "uri-reference",
    "iri",
    "iri-reference",
    "uuid",
    "uri-template",
    "json-pointer",
    "relative-json-pointer",
    "regex",
];

/// Components the form renderer ships.
pub const KNOWN_UI_COMPONENTS: &[&str] = &[
    "text-input",
    "email-input",
    "number-input",
    "select",
    "toggle",
    "textarea",
    "checkbox",
    "radio",
    "date-picker",
    "time-picker",
    "file-upload",
    "form",
    "group",
];

/// Machine-readable issue code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LintCode {
    MissingTypeOrRef,
    InvalidType,
    InvalidArrayBounds,
    InvalidStringBounds,
    InvalidRegexPattern,
    UnknownFormat,
    InvalidNumberBounds,
    InvalidMultipleOf,
    RequiredWithoutProperties,
    RequiredFieldNotInProperties,
    UnknownUiComponent,
    NegativeUiOrder,
    InvalidVersionFormat,
    InvalidTagType,
    DuplicateSchemaId,
    CircularReference,
    UnresolvedReference,
    UnsupportedReference,
}

impl LintCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingTypeOrRef => "MISSING_TYPE_OR_REF",
            Self::InvalidType => "INVALID_TYPE",
            Self::InvalidArrayBounds => "INVALID_ARRAY_BOUNDS",
            Self::InvalidStringBounds => "INVALID_STRING_BOUNDS",
            Self::InvalidRegexPattern => "INVALID_REGEX_PATTERN",
            Self::UnknownFormat => "UNKNOWN_FORMAT",
            Self::InvalidNumberBounds => "INVALID_NUMBER_BOUNDS",
            Self::InvalidMultipleOf => "INVALID_MULTIPLE_OF",
            Self::RequiredWithoutProperties => "REQUIRED_WITHOUT_PROPERTIES",
            Self::RequiredFieldNotInProperties => "REQUIRED_FIELD_NOT_IN_PROPERTIES",
            Self::UnknownUiComponent => "UNKNOWN_UI_COMPONENT",
            Self::NegativeUiOrder => "NEGATIVE_UI_ORDER",
            Self::InvalidVersionFormat => "INVALID_VERSION_FORMAT",
            Self::InvalidTagType => "INVALID_TAG_TYPE",
            Self::DuplicateSchemaId => "DUPLICATE_SCHEMA_ID",
            Self::CircularReference => "CIRCULAR_REFERENCE",
            Self::UnresolvedReference => "UNRESOLVED_REFERENCE",
            Self::UnsupportedReference => "UNSUPPORTED_REFERENCE",
        }
    }
}

impl fmt::Display for LintCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single lint finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintIssue {
    /// Location inside the schema, e.g. `properties.age.minimum`.
    pub path: String,
    pub message: String,
    pub code: LintCode,
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "[{}] {}", self.code, self.message)
        } else {
            write!(f, "[{}] {}: {}", self.code, self.path, self.message)
        }
    }
}

/// Errors and warnings from a lint run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LintReport {
    pub errors: Vec<LintIssue>,
    pub warnings: Vec<LintIssue>,
}

impl LintReport {
    /// No errors. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn merge(&mut self, other: LintReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    fn error(&mut self, path: String, code: LintCode, message: impl Into<String>) {
        self.errors.push(LintIssue {
            path,
            message: message.into(),
            code,
        });
    }

    fn warning(&mut self, path: String, code: LintCode, message: impl Into<String>) {
        self.warnings.push(LintIssue {
            path,
            message: message.into(),
            code,
        });
    }
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}.{segment}")
    }
}

/// Lint a schema and every subschema under `properties`,
/// `additionalProperties`, `items` and `$defs`.
pub fn lint_schema(schema: &Value) -> LintReport {
    let mut report = LintReport::default();
    lint_node(schema, "", &mut report);
    report
}

/// Constraint keywords collected from one node.
#[derive(Default)]
struct Facts<'a> {
    declared: Vec<&'a str>,
    min_items: Option<u64>,
    max_items: Option<u64>,
    min_length: Option<u64>,
    max_length: Option<u64>,
    minimum: Option<f64>,
    maximum: Option<f64>,
    multiple_of: Option<f64>,
    pattern: Option<&'a str>,
    format: Option<&'a str>,
    required: Option<Vec<&'a str>>,
    ui: Option<&'a Map<String, Value>>,
    business: Option<&'a Map<String, Value>>,
}

impl<'a> Facts<'a> {
    fn declares(&self, ty: SchemaType) -> bool {
        self.declared.first() == Some(&ty.as_str())
    }
}

fn lint_node(schema: &Value, path: &str, report: &mut LintReport) {
    let Some(map) = schema.as_object() else {
        // Boolean schemas are always well formed.
        return;
    };

    let has_any = |keys: &[&str]| keys.iter().any(|k| map.contains_key(*k));
    if !has_any(&["type", "$ref", "allOf", "anyOf", "oneOf", "not"]) {
        report.error(
            path.to_string(),
            LintCode::MissingTypeOrRef,
            "Schema must have a type, $ref, or logical operator",
        );
    }

    let valid_types = SchemaType::ALL
        .iter()
        .map(SchemaType::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    let mut facts = Facts::default();
    for keyword in keywords(schema) {
        match keyword {
            SchemaKeyword::Type(ref names) => {
                for name in names {
                    if name.parse::<SchemaType>().is_err() {
                        report.error(
                            join(path, "type"),
                            LintCode::InvalidType,
                            format!("Invalid type: {name}. Valid types are: {valid_types}"),
                        );
                    }
                }
                facts.declared = names.clone();
            }
            SchemaKeyword::Unknown { name: "type", value } => report.error(
                join(path, "type"),
                LintCode::InvalidType,
                format!("Invalid type: {value}. Valid types are: {valid_types}"),
            ),
            SchemaKeyword::Array(ArrayKeyword::MinItems(n)) => facts.min_items = Some(n),
            SchemaKeyword::Array(ArrayKeyword::MaxItems(n)) => facts.max_items = Some(n),
            SchemaKeyword::String(StringKeyword::MinLength(n)) => facts.min_length = Some(n),
            SchemaKeyword::String(StringKeyword::MaxLength(n)) => facts.max_length = Some(n),
            SchemaKeyword::String(StringKeyword::Pattern(p)) => facts.pattern = Some(p),
            SchemaKeyword::String(StringKeyword::Format(f)) => facts.format = Some(f),
            SchemaKeyword::Numeric(NumericKeyword::Minimum(n)) => facts.minimum = Some(n),
            SchemaKeyword::Numeric(NumericKeyword::Maximum(n)) => facts.maximum = Some(n),
            SchemaKeyword::Numeric(NumericKeyword::MultipleOf(n)) => facts.multiple_of = Some(n),
            SchemaKeyword::Object(ObjectKeyword::Required(names)) => facts.required = Some(names),
            SchemaKeyword::Extension(ExtensionKeyword::Ui(ui)) => facts.ui = Some(ui),
            SchemaKeyword::Extension(ExtensionKeyword::Business(b)) => facts.business = Some(b),
            _ => {}
        }
    }

    if facts.declares(SchemaType::Object) || map.contains_key("properties") {
        lint_object(schema, path, report);
    }
    if facts.declares(SchemaType::Array) || map.contains_key("items") {
        lint_array(schema, &facts, path, report);
    }
    if facts.declares(SchemaType::String) {
        lint_string(&facts, path, report);
    }
    if facts.declares(SchemaType::Number) || facts.declares(SchemaType::Integer) {
        lint_number(&facts, path, report);
    }
    if let Some(required) = &facts.required {
        lint_required(schema, required, path, report);
    }
    if let Some(ui) = facts.ui {
        lint_ui(ui, &join(path, "ui"), report);
    }
    if let Some(business) = facts.business {
        lint_business(business, &join(path, "business"), report);
    }

    if let Some(defs) = map.get("$defs").and_then(Value::as_object) {
        for (name, def) in defs {
            lint_node(def, &join(path, &format!("$defs.{name}")), report);
        }
    }
}

fn lint_object(schema: &Value, path: &str, report: &mut LintReport) {
    if let Some(props) = properties(schema) {
        for (name, child) in props {
            lint_node(child, &join(path, &format!("properties.{name}")), report);
        }
    }
    if let Some(additional) = schema.get("additionalProperties").filter(|v| v.is_object()) {
        lint_node(additional, &join(path, "additionalProperties"), report);
    }
}

fn lint_array(schema: &Value, facts: &Facts<'_>, path: &str, report: &mut LintReport) {
    let items_path = join(path, "items");
    match schema.get("items") {
        Some(Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                lint_node(item, &format!("{items_path}[{i}]"), report);
            }
        }
        Some(item @ Value::Object(_)) => lint_node(item, &items_path, report),
        _ => {}
    }

    if let (Some(min), Some(max)) = (facts.min_items, facts.max_items) {
        if min > max {
            report.error(
                join(path, "minItems"),
                LintCode::InvalidArrayBounds,
                "minItems cannot be greater than maxItems",
            );
        }
    }
}

fn lint_string(facts: &Facts<'_>, path: &str, report: &mut LintReport) {
    if let (Some(min), Some(max)) = (facts.min_length, facts.max_length) {
        if min > max {
            report.error(
                join(path, "minLength"),
                LintCode::InvalidStringBounds,
                "minLength cannot be greater than maxLength",
            );
        }
    }

    if let Some(pattern) = facts.pattern {
        if let Err(e) = Regex::new(pattern) {
            tracing::debug!(pattern, error = %e, "pattern does not compile");
            report.error(
                join(path, "pattern"),
                LintCode::InvalidRegexPattern,
                format!("Invalid regex pattern: {pattern}"),
            );
        }
    }

    if let Some(format) = facts.format {
        if !KNOWN_FORMATS.contains(&format) {
            report.warning(
                join(path, "format"),
                LintCode::UnknownFormat,
                format!(
                    "Unknown format: {format}. Valid formats: {}",
                    KNOWN_FORMATS.join(", ")
                ),
            );
        }
    }
}

fn lint_number(facts: &Facts<'_>, path: &str, report: &mut LintReport) {
    if let (Some(min), Some(max)) = (facts.minimum, facts.maximum) {
        if min > max {
            report.error(
                join(path, "minimum"),
                LintCode::InvalidNumberBounds,
                "minimum cannot be greater than maximum",
            );
        }
    }

    if facts.multiple_of.is_some_and(|m| m <= 0.0) {
        report.error(
            join(path, "multipleOf"),
            LintCode::InvalidMultipleOf,
            "multipleOf must be a positive number",
        );
    }
}

fn lint_required(schema: &Value, required: &[&str], path: &str, report: &mut LintReport) {
    let required_path = join(path, "required");
    let Some(props) = properties(schema) else {
        report.error(
            required_path,
            LintCode::RequiredWithoutProperties,
            "required fields specified but no properties defined",
        );
        return;
    };

    for name in required {
        if !props.contains_key(*name) {
            report.error(
                required_path.clone(),
                LintCode::RequiredFieldNotInProperties,
                format!("Required field '{name}' not found in properties"),
            );
        }
    }
}

fn lint_ui(ui: &Map<String, Value>, path: &str, report: &mut LintReport) {
    if let Some(component) = ui.get("component").and_then(Value::as_str) {
        if !KNOWN_UI_COMPONENTS.contains(&component) {
            report.warning(
                join(path, "component"),
                LintCode::UnknownUiComponent,
                format!(
                    "Unknown component: {component}. Valid components: {}",
                    KNOWN_UI_COMPONENTS.join(", ")
                ),
            );
        }
    }

    if ui.get("order").and_then(Value::as_f64).is_some_and(|o| o < 0.0) {
        report.warning(
            join(path, "order"),
            LintCode::NegativeUiOrder,
            "UI order should be a positive number",
        );
    }
}

/// `MAJOR.MINOR.PATCH`, digits only.
fn is_semver(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

fn lint_business(business: &Map<String, Value>, path: &str, report: &mut LintReport) {
    if let Some(version) = business.get("version").and_then(Value::as_str) {
        if !is_semver(version) {
            report.warning(
                join(path, "version"),
                LintCode::InvalidVersionFormat,
                "Version should follow semantic versioning format (e.g., 1.0.0)",
            );
        }
    }

    if let Some(tags) = business.get("tags").and_then(Value::as_array) {
        for (i, tag) in tags.iter().enumerate() {
            if !tag.is_string() {
                report.error(
                    format!("{}[{i}]", join(path, "tags")),
                    LintCode::InvalidTagType,
                    "Tags must be strings",
                );
            }
        }
    }
}

/// Keywords whose values are instance data, not subschemas.
const DATA_KEYWORDS: &[&str] = &["default", "examples", "const", "enum"];

/// Every `$ref` string under `value` with the schema path it sits at.
fn collect_refs(value: &Value, path: &str, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match (key.as_str(), child) {
                    ("$ref", Value::String(pointer)) => out.push((path.to_string(), pointer.clone())),
                    (key, _) if DATA_KEYWORDS.contains(&key) => {}
                    _ => collect_refs(child, &join(path, key), out),
                }
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                collect_refs(item, &format!("{path}[{i}]"), out);
            }
        }
        _ => {}
    }
}

/// Plain JSON-pointer lookup of a `#...` fragment.
fn json_pointer_target<'r>(root: &'r Value, pointer: &str) -> Option<&'r Value> {
    root.pointer(pointer.strip_prefix('#')?)
}

/// Names of the `$defs` entries referenced anywhere under `value`.
fn def_targets(value: &Value) -> Vec<String> {
    let mut refs = Vec::new();
    collect_refs(value, "", &mut refs);
    let mut names = Vec::new();
    for (_, pointer) in refs {
        if let Ok(RefPointer::Defs(name)) = RefPointer::parse(&pointer) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Cycles in the `$defs` reference graph of `root`.
///
/// Each cycle lists definition names and repeats its first name at the
/// end (`["Person", "Person"]`, `["A", "B", "A"]`). A cycle is reported
/// once regardless of where it is entered.
pub fn find_ref_cycles(root: &Value) -> Vec<Vec<String>> {
    let Some(defs) = root.get("$defs").and_then(Value::as_object) else {
        return Vec::new();
    };

    let edges: IndexMap<&str, Vec<String>> = defs
        .iter()
        .map(|(name, def)| (name.as_str(), def_targets(def)))
        .collect();

    let mut cycles = Vec::new();
    let mut seen = HashSet::new();
    for start in edges.keys() {
        let mut stack = vec![start.to_string()];
        walk_cycles(&edges, &mut stack, &mut seen, &mut cycles);
    }
    cycles
}

fn walk_cycles(
    edges: &IndexMap<&str, Vec<String>>,
    stack: &mut Vec<String>,
    seen: &mut HashSet<Vec<String>>,
    cycles: &mut Vec<Vec<String>>,
) {
    let Some(current) = stack.last() else {
        return;
    };
    let Some(targets) = edges.get(current.as_str()) else {
        return;
    };

    for target in targets {
        if let Some(pos) = stack.iter().position(|n| n == target) {
            let mut cycle = stack[pos..].to_vec();
            if seen.insert(canonical(&cycle)) {
                cycle.push(target.clone());
                cycles.push(cycle);
            }
        } else {
            stack.push(target.clone());
            walk_cycles(edges, stack, seen, cycles);
            stack.pop();
        }
    }
}

/// Rotation of `cycle` starting at its smallest name.
fn canonical(cycle: &[String]) -> Vec<String> {
    let start = cycle
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    cycle[start..].iter().chain(&cycle[..start]).cloned().collect()
}

/// Lint a set of named schemas.
///
/// Adds, on top of [`lint_schema`] per schema (paths prefixed with the
/// schema name):
///
/// - an error per local `$ref` that does not resolve in its own schema;
/// - a warning per local `$ref` that resolves as a JSON pointer but uses a
///   form traversal does not expand (`#`, `#/definitions/...`);
/// - an error per `$id` shared by more than one schema;
/// - a warning per `$defs` cycle.
pub fn lint_registry<'a, I, S>(schemas: I) -> LintReport
where
    I: IntoIterator<Item = (S, &'a Value)>,
    S: AsRef<str>,
{
    let mut report = LintReport::default();
    let mut ids: HashMap<String, Vec<String>> = HashMap::new();

    for (name, schema) in schemas {
        let name = name.as_ref();
        lint_node(schema, name, &mut report);

        if let Some(id) = schema_id(schema) {
            ids.entry(id.to_string()).or_default().push(name.to_string());
        }

        let mut refs = Vec::new();
        collect_refs(schema, name, &mut refs);
        for (path, pointer) in refs {
            if !pointer.starts_with('#') {
                // Cross-document references are resolved by the registry.
                continue;
            }
            match RefPointer::parse(&pointer) {
                Ok(parsed) if parsed.lookup(schema).is_some() => {}
                Err(_) if json_pointer_target(schema, &pointer).is_some() => report.warning(
                    join(&path, "$ref"),
                    LintCode::UnsupportedReference,
                    format!("Reference {pointer} is valid but is not expanded in forms"),
                ),
                _ => report.error(
                    join(&path, "$ref"),
                    LintCode::UnresolvedReference,
                    format!("Reference {pointer} does not resolve"),
                ),
            }
        }

        for cycle in find_ref_cycles(schema) {
            report.warning(
                name.to_string(),
                LintCode::CircularReference,
                format!("Circular references detected: {}", cycle.join(" -> ")),
            );
        }
    }

    let mut duplicates: Vec<(String, Vec<String>)> =
        ids.into_iter().filter(|(_, names)| names.len() > 1).collect();
    duplicates.sort();
    for (id, names) in duplicates {
        report.error(
            String::new(),
            LintCode::DuplicateSchemaId,
            format!("Duplicate schema $id {id} in: {}", names.join(", ")),
        );
    }

    report
}
