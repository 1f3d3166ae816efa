//! # Form Data Utilities
//!
//! Builds initial form data from a schema, lists and flattens field paths,
//! re-walks a path to its schema node, and checks a data document against
//! the field-level constraints the form enforces.
//!
//! All walks here use [`ArrayItemsMode::Skip`]: a single-schema array is an
//! empty list whose elements the user adds at runtime, so its item schema
//! contributes no data, paths or checks.

use std::fmt;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use sform_core::{
    build_field_path, items_shape, keywords, properties, ExclusiveBound, FieldPath, ItemsShape,
    SchemaKeyword, SchemaType,
};
use sform_core::keyword::{NumericKeyword, ObjectKeyword, StringKeyword};

use crate::resolve::{resolve_ref, DEFAULT_RESOLVE_DEPTH};
use crate::traverse::{ArrayItemsMode, SchemaWalker, TraversalOptions, VisitContext};

fn data_walker<'r>(schema: &'r Value, root: Option<&'r Value>, max_depth: usize) -> SchemaWalker<'r> {
    SchemaWalker::new(
        root.unwrap_or(schema),
        TraversalOptions::default()
            .with_max_depth(max_depth)
            .with_array_items(ArrayItemsMode::Skip),
    )
}

/// The empty value of a schema's type.
pub fn zero_value(schema: &Value) -> Value {
    match SchemaType::of(schema) {
        SchemaType::String => Value::String(String::new()),
        SchemaType::Integer | SchemaType::Number => Value::from(0),
        SchemaType::Boolean => Value::Bool(false),
        SchemaType::Null => Value::Null,
        SchemaType::Array => Value::Array(Vec::new()),
        SchemaType::Object => Value::Object(Map::new()),
    }
}

fn first_example(schema: &Value) -> Option<&Value> {
    schema.get("examples")?.as_array()?.first()
}

/// Initial form data for `schema`.
///
/// A root-level `examples[0]` is returned as-is. Otherwise each leaf takes
/// its `examples[0]`, then its `default`, then its zero value; single-schema
/// arrays start empty. `root` supplies `$defs` when `schema` is a subschema.
pub fn initialize_data(schema: &Value, root: Option<&Value>, max_depth: usize) -> Value {
    if let Some(example) = first_example(schema) {
        return example.clone();
    }

    data_walker(schema, root, max_depth)
        .walk_from(schema, |ctx: &VisitContext<'_>| {
            first_example(ctx.schema)
                .or_else(|| ctx.schema.get("default"))
                .cloned()
                .unwrap_or_else(|| zero_value(ctx.schema))
        })
        .into_value()
}

/// Paths of every primitive field, in traversal order.
pub fn field_paths(schema: &Value, root: Option<&Value>, max_depth: usize) -> Vec<FieldPath> {
    let mut paths = Vec::new();
    data_walker(schema, root, max_depth).walk_from(schema, |ctx: &VisitContext<'_>| {
        if ctx.schema_type().is_primitive() {
            paths.push(FieldPath::from(ctx.path));
        }
    });
    paths
}

/// Every visited node below the root, keyed by dotted path, in traversal
/// order. Nodes are `$ref`-resolved.
pub fn flatten_schema(
    schema: &Value,
    root: Option<&Value>,
    max_depth: usize,
) -> IndexMap<String, Value> {
    let mut flat = IndexMap::new();
    data_walker(schema, root, max_depth).walk_from(schema, |ctx: &VisitContext<'_>| {
        if !ctx.is_root() {
            flat.insert(ctx.dotted_path(), ctx.schema.clone());
        }
    });
    flat
}

/// The resolved schema node at `path` under `root`.
///
/// Property segments select by key, tuple segments by index. Single-schema
/// `items` are stepped through without consuming a segment, mirroring how
/// traversal paths are built.
pub fn schema_at_path(root: &Value, path: &FieldPath) -> Option<Value> {
    let mut current = resolve_ref(root, root).into_owned();
    for segment in path.segments() {
        current = step(&current, segment, root)?;
    }
    Some(current)
}

fn step(node: &Value, segment: &str, root: &Value) -> Option<Value> {
    let mut node = node.clone();
    for _ in 0..=DEFAULT_RESOLVE_DEPTH {
        if let Some(child) = properties(&node).and_then(|props| props.get(segment)) {
            return Some(resolve_ref(child, root).into_owned());
        }
        match items_shape(&node)? {
            ItemsShape::Tuple(items) => {
                let index: usize = segment.parse().ok()?;
                return items.get(index).map(|item| resolve_ref(item, root).into_owned());
            }
            ItemsShape::Single(item) => {
                let next = resolve_ref(item, root).into_owned();
                node = next;
            }
        }
    }
    None
}

/// Value at `path` in `data`. Numeric segments index into arrays.
pub fn get_nested_value<'d, S: AsRef<str>>(data: &'d Value, path: &[S]) -> Option<&'d Value> {
    path.iter().try_fold(data, |current, key| {
        let key = key.as_ref();
        match current {
            Value::Object(map) => map.get(key),
            Value::Array(list) => key.parse::<usize>().ok().and_then(|i| list.get(i)),
            _ => None,
        }
    })
}

/// Store `value` at `path`, creating objects along the way. Scalars in the
/// way are replaced by objects; existing array elements are written in place.
pub fn set_nested_value<S: AsRef<str>>(data: &mut Value, path: &[S], value: Value) {
    let Some((key, rest)) = path.split_first() else {
        *data = value;
        return;
    };
    let key = key.as_ref();

    if let Value::Array(list) = data {
        if let Some(slot) = key.parse::<usize>().ok().and_then(|i| list.get_mut(i)) {
            set_nested_value(slot, rest, value);
            return;
        }
    }

    if !data.is_object() {
        *data = Value::Object(Map::new());
    }
    if let Value::Object(map) = data {
        let slot = map.entry(key.to_string()).or_insert(Value::Null);
        set_nested_value(slot, rest, value);
    }
}

/// Which field-level check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataCheck {
    Required,
    Type,
    MinLength,
    MaxLength,
    Pattern,
    Minimum,
    Maximum,
    Enum,
    Const,
}

/// One failed check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataViolation {
    /// Dotted field path (`""` for the document root).
    pub path: String,
    pub check: DataCheck,
    pub message: String,
}

impl fmt::Display for DataViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Outcome of [`validate_data`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataReport {
    pub violations: Vec<DataViolation>,
}

impl DataReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

/// Check `data` against the field constraints of `schema`.
///
/// Covers `required`, `type`, string length, `pattern`, numeric bounds
/// (including draft-4 boolean `exclusive*`), `enum` and `const`. Empty
/// values (`null`, missing, `""`) only fail `required`. This is the form's
/// inline check; full JSON Schema validation goes through
/// [`SchemaRegistry`](crate::registry::SchemaRegistry).
pub fn validate_data(
    data: &Value,
    schema: &Value,
    root: Option<&Value>,
    max_depth: usize,
) -> DataReport {
    let mut report = DataReport::default();
    data_walker(schema, root, max_depth).walk_from(schema, |ctx: &VisitContext<'_>| {
        check_node(ctx, data, &mut report.violations);
    });
    report
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn type_accepts(expected: SchemaType, actual: SchemaType) -> bool {
    expected == actual || (expected == SchemaType::Number && actual == SchemaType::Integer)
}

fn check_node(ctx: &VisitContext<'_>, data: &Value, out: &mut Vec<DataViolation>) {
    let path = ctx.dotted_path();
    let value = get_nested_value(data, ctx.path);
    let schema_keywords = keywords(ctx.schema);

    let mut push = |path: String, check: DataCheck, message: String| {
        out.push(DataViolation {
            path,
            check,
            message,
        });
    };

    for keyword in &schema_keywords {
        if let SchemaKeyword::Object(ObjectKeyword::Required(names)) = keyword {
            for name in names {
                if is_blank(value.and_then(|v| v.get(*name))) {
                    let field = build_field_path(&path, name);
                    let message = format!("Field '{field}' is required");
                    push(field, DataCheck::Required, message);
                }
            }
        }
    }

    let Some(value) = value.filter(|v| !is_blank(Some(v))) else {
        return;
    };

    let exclusive_min = schema_keywords.iter().any(|k| {
        matches!(
            k,
            SchemaKeyword::Numeric(NumericKeyword::ExclusiveMinimum(ExclusiveBound::Flag(true)))
        )
    });
    let exclusive_max = schema_keywords.iter().any(|k| {
        matches!(
            k,
            SchemaKeyword::Numeric(NumericKeyword::ExclusiveMaximum(ExclusiveBound::Flag(true)))
        )
    });
    let actual = SchemaType::of_value(value);
    let number = value.as_f64();
    let text = value.as_str();

    for keyword in &schema_keywords {
        match keyword {
            SchemaKeyword::Type(_) => {
                if let Some(types) = keyword.known_types() {
                    if !types.iter().any(|t| type_accepts(*t, actual)) {
                        let names: Vec<&str> = types.iter().map(SchemaType::as_str).collect();
                        push(
                            path.clone(),
                            DataCheck::Type,
                            format!("Field '{path}' must be of type {}", names.join(" | ")),
                        );
                        return;
                    }
                }
            }
            SchemaKeyword::String(StringKeyword::MinLength(min)) => {
                if text.is_some_and(|s| (s.chars().count() as u64) < *min) {
                    push(
                        path.clone(),
                        DataCheck::MinLength,
                        format!("Field '{path}' minimum length is {min}"),
                    );
                }
            }
            SchemaKeyword::String(StringKeyword::MaxLength(max)) => {
                if text.is_some_and(|s| s.chars().count() as u64 > *max) {
                    push(
                        path.clone(),
                        DataCheck::MaxLength,
                        format!("Field '{path}' maximum length is {max}"),
                    );
                }
            }
            SchemaKeyword::String(StringKeyword::Pattern(pattern)) => {
                let Some(s) = text else { continue };
                match Regex::new(pattern) {
                    Ok(re) if !re.is_match(s) => push(
                        path.clone(),
                        DataCheck::Pattern,
                        format!("Field '{path}' does not match pattern {pattern}"),
                    ),
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(path = %path, pattern, error = %e, "invalid pattern, check skipped");
                    }
                }
            }
            SchemaKeyword::Numeric(bound) => {
                let Some(n) = number else { continue };
                match bound {
                    NumericKeyword::Minimum(min)
                        if n < *min || (exclusive_min && n <= *min) =>
                    {
                        push(
                            path.clone(),
                            DataCheck::Minimum,
                            format!("Field '{path}' minimum value is {min}"),
                        );
                    }
                    NumericKeyword::Maximum(max)
                        if n > *max || (exclusive_max && n >= *max) =>
                    {
                        push(
                            path.clone(),
                            DataCheck::Maximum,
                            format!("Field '{path}' maximum value is {max}"),
                        );
                    }
                    NumericKeyword::ExclusiveMinimum(ExclusiveBound::Value(min)) if n <= *min => {
                        push(
                            path.clone(),
                            DataCheck::Minimum,
                            format!("Field '{path}' must be greater than {min}"),
                        );
                    }
                    NumericKeyword::ExclusiveMaximum(ExclusiveBound::Value(max)) if n >= *max => {
                        push(
                            path.clone(),
                            DataCheck::Maximum,
                            format!("Field '{path}' must be less than {max}"),
                        );
                    }
                    _ => {}
                }
            }
            SchemaKeyword::Enum(options) if !options.contains(value) => {
                push(
                    path.clone(),
                    DataCheck::Enum,
                    format!("Field '{path}' must be one of {}", Value::from(options.to_vec())),
                );
            }
            SchemaKeyword::Const(expected) if *expected != value => {
                push(
                    path.clone(),
                    DataCheck::Const,
                    format!("Field '{path}' must equal {expected}"),
                );
            }
            _ => {}
        }
    }
}
