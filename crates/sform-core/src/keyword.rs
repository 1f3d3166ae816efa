//! # Schema Keyword Model
//!
//! JSON Schema keywords are loosely typed: `exclusiveMaximum` is a number in
//! draft 2020-12 and a boolean in draft 4, `type` is a string or a list,
//! `items` is a schema or a list of schemas. Consumers that need to reason
//! about keywords (lint, docs, data checks) classify them here once instead
//! of probing `Value`s ad hoc.
//!
//! Every keyword maps to exactly one [`SchemaKeyword`] variant. A known
//! keyword whose value has the wrong shape, and any keyword sform does not
//! know, becomes [`SchemaKeyword::Unknown`].

use serde_json::{Map, Value};

use crate::types::SchemaType;

/// One classified keyword of a schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKeyword<'a> {
    /// `type`, with each listed name kept verbatim.
    Type(Vec<&'a str>),
    String(StringKeyword<'a>),
    Numeric(NumericKeyword),
    Array(ArrayKeyword),
    Object(ObjectKeyword<'a>),
    /// `enum`.
    Enum(&'a [Value]),
    /// `const`.
    Const(&'a Value),
    Metadata(MetadataKeyword<'a>),
    Extension(ExtensionKeyword<'a>),
    Reference(ReferenceKeyword<'a>),
    /// Keywords that hold subschemas (`properties`, `items`, `allOf`, ...).
    Applicator { name: &'a str, value: &'a Value },
    /// Anything else, kept for forward compatibility.
    Unknown { name: &'a str, value: &'a Value },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StringKeyword<'a> {
    MinLength(u64),
    MaxLength(u64),
    Pattern(&'a str),
    Format(&'a str),
    ContentEncoding(&'a str),
    ContentMediaType(&'a str),
}

/// `exclusiveMinimum`/`exclusiveMaximum`: a bound (2020-12) or a flag that
/// makes the sibling `minimum`/`maximum` exclusive (draft 4).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExclusiveBound {
    Flag(bool),
    Value(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericKeyword {
    Minimum(f64),
    Maximum(f64),
    ExclusiveMinimum(ExclusiveBound),
    ExclusiveMaximum(ExclusiveBound),
    MultipleOf(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArrayKeyword {
    MinItems(u64),
    MaxItems(u64),
    UniqueItems(bool),
    MinContains(u64),
    MaxContains(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKeyword<'a> {
    Required(Vec<&'a str>),
    MinProperties(u64),
    MaxProperties(u64),
    DependentRequired(&'a Map<String, Value>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetadataKeyword<'a> {
    Title(&'a str),
    Description(&'a str),
    Comment(&'a str),
    Default(&'a Value),
    Examples(&'a [Value]),
    Deprecated(bool),
    ReadOnly(bool),
    WriteOnly(bool),
}

/// Application-specific extension blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExtensionKeyword<'a> {
    /// Rendering hints (`component`, `order`, `group`, `placeholder`, ...).
    Ui(&'a Map<String, Value>),
    /// Business metadata (`category`, `tags`, `version`, ...).
    Business(&'a Map<String, Value>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReferenceKeyword<'a> {
    Ref(&'a str),
    Id(&'a str),
    Schema(&'a str),
    Anchor(&'a str),
    DynamicRef(&'a str),
    Defs(&'a Map<String, Value>),
}

const APPLICATORS: &[&str] = &[
    "properties",
    "patternProperties",
    "additionalProperties",
    "unevaluatedProperties",
    "propertyNames",
    "items",
    "prefixItems",
    "additionalItems",
    "unevaluatedItems",
    "contains",
    "allOf",
    "anyOf",
    "oneOf",
    "not",
    "if",
    "then",
    "else",
    "dependentSchemas",
    "contentSchema",
];

/// Classify a single keyword.
pub fn classify<'a>(name: &'a str, value: &'a Value) -> SchemaKeyword<'a> {
    let unknown = SchemaKeyword::Unknown { name, value };
    let classified = match name {
        "type" => match value {
            Value::String(s) => Some(SchemaKeyword::Type(vec![s.as_str()])),
            Value::Array(list) => list
                .iter()
                .map(Value::as_str)
                .collect::<Option<Vec<_>>>()
                .map(SchemaKeyword::Type),
            _ => None,
        },
        "minLength" => value.as_u64().map(|n| SchemaKeyword::String(StringKeyword::MinLength(n))),
        "maxLength" => value.as_u64().map(|n| SchemaKeyword::String(StringKeyword::MaxLength(n))),
        "pattern" => value.as_str().map(|s| SchemaKeyword::String(StringKeyword::Pattern(s))),
        "format" => value.as_str().map(|s| SchemaKeyword::String(StringKeyword::Format(s))),
        "contentEncoding" => value
            .as_str()
            .map(|s| SchemaKeyword::String(StringKeyword::ContentEncoding(s))),
        "contentMediaType" => value
            .as_str()
            .map(|s| SchemaKeyword::String(StringKeyword::ContentMediaType(s))),
        "minimum" => value.as_f64().map(|n| SchemaKeyword::Numeric(NumericKeyword::Minimum(n))),
        "maximum" => value.as_f64().map(|n| SchemaKeyword::Numeric(NumericKeyword::Maximum(n))),
        "exclusiveMinimum" => exclusive_bound(value)
            .map(|b| SchemaKeyword::Numeric(NumericKeyword::ExclusiveMinimum(b))),
        "exclusiveMaximum" => exclusive_bound(value)
            .map(|b| SchemaKeyword::Numeric(NumericKeyword::ExclusiveMaximum(b))),
        "multipleOf" => value.as_f64().map(|n| SchemaKeyword::Numeric(NumericKeyword::MultipleOf(n))),
        "minItems" => value.as_u64().map(|n| SchemaKeyword::Array(ArrayKeyword::MinItems(n))),
        "maxItems" => value.as_u64().map(|n| SchemaKeyword::Array(ArrayKeyword::MaxItems(n))),
        "uniqueItems" => value.as_bool().map(|b| SchemaKeyword::Array(ArrayKeyword::UniqueItems(b))),
        "minContains" => value.as_u64().map(|n| SchemaKeyword::Array(ArrayKeyword::MinContains(n))),
        "maxContains" => value.as_u64().map(|n| SchemaKeyword::Array(ArrayKeyword::MaxContains(n))),
        "required" => value.as_array().and_then(|list| {
            list.iter()
                .map(Value::as_str)
                .collect::<Option<Vec<_>>>()
                .map(|names| SchemaKeyword::Object(ObjectKeyword::Required(names)))
        }),
        "minProperties" => value
            .as_u64()
            .map(|n| SchemaKeyword::Object(ObjectKeyword::MinProperties(n))),
        "maxProperties" => value
            .as_u64()
            .map(|n| SchemaKeyword::Object(ObjectKeyword::MaxProperties(n))),
        "dependentRequired" => value
            .as_object()
            .map(|m| SchemaKeyword::Object(ObjectKeyword::DependentRequired(m))),
        "enum" => value.as_array().map(|list| SchemaKeyword::Enum(list.as_slice())),
        "const" => Some(SchemaKeyword::Const(value)),
        "title" => value.as_str().map(|s| SchemaKeyword::Metadata(MetadataKeyword::Title(s))),
        "description" => value
            .as_str()
            .map(|s| SchemaKeyword::Metadata(MetadataKeyword::Description(s))),
        "$comment" => value.as_str().map(|s| SchemaKeyword::Metadata(MetadataKeyword::Comment(s))),
        "default" => Some(SchemaKeyword::Metadata(MetadataKeyword::Default(value))),
        "examples" => value
            .as_array()
            .map(|list| SchemaKeyword::Metadata(MetadataKeyword::Examples(list.as_slice()))),
        "deprecated" => value
            .as_bool()
            .map(|b| SchemaKeyword::Metadata(MetadataKeyword::Deprecated(b))),
        "readOnly" => value.as_bool().map(|b| SchemaKeyword::Metadata(MetadataKeyword::ReadOnly(b))),
        "writeOnly" => value
            .as_bool()
            .map(|b| SchemaKeyword::Metadata(MetadataKeyword::WriteOnly(b))),
        "ui" => value.as_object().map(|m| SchemaKeyword::Extension(ExtensionKeyword::Ui(m))),
        "business" => value
            .as_object()
            .map(|m| SchemaKeyword::Extension(ExtensionKeyword::Business(m))),
        "$ref" => value.as_str().map(|s| SchemaKeyword::Reference(ReferenceKeyword::Ref(s))),
        "$id" => value.as_str().map(|s| SchemaKeyword::Reference(ReferenceKeyword::Id(s))),
        "$schema" => value.as_str().map(|s| SchemaKeyword::Reference(ReferenceKeyword::Schema(s))),
        "$anchor" => value.as_str().map(|s| SchemaKeyword::Reference(ReferenceKeyword::Anchor(s))),
        "$dynamicRef" => value
            .as_str()
            .map(|s| SchemaKeyword::Reference(ReferenceKeyword::DynamicRef(s))),
        "$defs" | "definitions" => value
            .as_object()
            .map(|m| SchemaKeyword::Reference(ReferenceKeyword::Defs(m))),
        other if APPLICATORS.contains(&other) => Some(SchemaKeyword::Applicator { name, value }),
        _ => None,
    };
    classified.unwrap_or(unknown)
}

fn exclusive_bound(value: &Value) -> Option<ExclusiveBound> {
    match value {
        Value::Bool(b) => Some(ExclusiveBound::Flag(*b)),
        other => other.as_f64().map(ExclusiveBound::Value),
    }
}

/// Classify every keyword of a schema node, in declaration order.
///
/// Non-object nodes (boolean schemas) have no keywords.
pub fn keywords(schema: &Value) -> Vec<SchemaKeyword<'_>> {
    schema
        .as_object()
        .map(|map| map.iter().map(|(k, v)| classify(k, v)).collect())
        .unwrap_or_default()
}

impl<'a> SchemaKeyword<'a> {
    /// The listed types when this is a `type` keyword naming only known types.
    pub fn known_types(&self) -> Option<Vec<SchemaType>> {
        match self {
            Self::Type(names) => names.iter().map(|n| n.parse().ok()).collect(),
            _ => None,
        }
    }
}
