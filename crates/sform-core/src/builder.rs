//! # Schema Builder
//!
//! Fluent construction of schema literals.
//!
//! ```
//! use sform_core::SchemaBuilder;
//!
//! let schema = SchemaBuilder::object()
//!     .title("User")
//!     .property("name", SchemaBuilder::string().min(1).build())
//!     .property("age", SchemaBuilder::integer().minimum(0.0).build())
//!     .required(["name"])
//!     .build();
//!
//! assert_eq!(schema["properties"]["name"]["minLength"], 1);
//! ```

use serde_json::{Map, Value};

use crate::types::SchemaType;

/// Builds a schema node one keyword at a time.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    schema: Map<String, Value>,
}

impl SchemaBuilder {
    /// An empty schema with no keywords.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object() -> Self {
        Self::new().schema_type(SchemaType::Object)
    }

    pub fn array() -> Self {
        Self::new().schema_type(SchemaType::Array)
    }

    pub fn string() -> Self {
        Self::new().schema_type(SchemaType::String)
    }

    pub fn number() -> Self {
        Self::new().schema_type(SchemaType::Number)
    }

    pub fn integer() -> Self {
        Self::new().schema_type(SchemaType::Integer)
    }

    pub fn boolean() -> Self {
        Self::new().schema_type(SchemaType::Boolean)
    }

    /// A bare `$ref` node.
    pub fn reference(pointer: impl Into<String>) -> Self {
        Self::new().set("$ref", Value::String(pointer.into()))
    }

    pub fn schema_type(self, ty: SchemaType) -> Self {
        self.set("type", Value::String(ty.as_str().to_string()))
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.set("$id", Value::String(id.into()))
    }

    pub fn title(self, title: impl Into<String>) -> Self {
        self.set("title", Value::String(title.into()))
    }

    pub fn description(self, description: impl Into<String>) -> Self {
        self.set("description", Value::String(description.into()))
    }

    pub fn required<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = fields.into_iter().map(|f| Value::String(f.into())).collect();
        self.set("required", Value::Array(list))
    }

    pub fn default_value(self, value: Value) -> Self {
        self.set("default", value)
    }

    pub fn examples(self, examples: Vec<Value>) -> Self {
        self.set("examples", Value::Array(examples))
    }

    pub fn enum_values(self, values: Vec<Value>) -> Self {
        self.set("enum", Value::Array(values))
    }

    /// Lower bound appropriate to the declared type: `minLength`, `minimum`,
    /// `minItems` or `minProperties`. Ignored when no type is set.
    pub fn min(self, min: u64) -> Self {
        match self.declared_type() {
            Some(SchemaType::String) => self.set("minLength", min.into()),
            Some(SchemaType::Number | SchemaType::Integer) => self.set("minimum", min.into()),
            Some(SchemaType::Array) => self.set("minItems", min.into()),
            Some(SchemaType::Object) => self.set("minProperties", min.into()),
            _ => self,
        }
    }

    /// Upper bound counterpart of [`SchemaBuilder::min`].
    pub fn max(self, max: u64) -> Self {
        match self.declared_type() {
            Some(SchemaType::String) => self.set("maxLength", max.into()),
            Some(SchemaType::Number | SchemaType::Integer) => self.set("maximum", max.into()),
            Some(SchemaType::Array) => self.set("maxItems", max.into()),
            Some(SchemaType::Object) => self.set("maxProperties", max.into()),
            _ => self,
        }
    }

    /// `minimum`; only applied to numeric schemas.
    pub fn minimum(self, min: f64) -> Self {
        if self.declared_type().is_some_and(|t| t.is_numeric()) {
            self.set("minimum", min.into())
        } else {
            self
        }
    }

    /// `maximum`; only applied to numeric schemas.
    pub fn maximum(self, max: f64) -> Self {
        if self.declared_type().is_some_and(|t| t.is_numeric()) {
            self.set("maximum", max.into())
        } else {
            self
        }
    }

    pub fn pattern(self, pattern: impl Into<String>) -> Self {
        self.set("pattern", Value::String(pattern.into()))
    }

    pub fn format(self, format: impl Into<String>) -> Self {
        self.set("format", Value::String(format.into()))
    }

    /// Add one entry to `properties`, keeping insertion order.
    pub fn property(mut self, name: impl Into<String>, schema: Value) -> Self {
        let props = self
            .schema
            .entry("properties")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = props {
            map.insert(name.into(), schema);
        }
        self
    }

    /// Replace `properties` wholesale.
    pub fn properties(self, props: Map<String, Value>) -> Self {
        self.set("properties", Value::Object(props))
    }

    /// Single-schema `items`.
    pub fn items(self, items: Value) -> Self {
        self.set("items", items)
    }

    /// Tuple-style `items`.
    pub fn tuple_items(self, items: Vec<Value>) -> Self {
        self.set("items", Value::Array(items))
    }

    /// Add one named definition to `$defs`.
    pub fn def(mut self, name: impl Into<String>, schema: Value) -> Self {
        let defs = self
            .schema
            .entry("$defs")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = defs {
            map.insert(name.into(), schema);
        }
        self
    }

    /// `ui` rendering extension block.
    pub fn ui(self, ui: Value) -> Self {
        self.set("ui", ui)
    }

    /// `business` metadata extension block.
    pub fn business(self, business: Value) -> Self {
        self.set("business", business)
    }

    /// Set an arbitrary keyword.
    pub fn set(mut self, keyword: impl Into<String>, value: Value) -> Self {
        self.schema.insert(keyword.into(), value);
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.schema)
    }

    fn declared_type(&self) -> Option<SchemaType> {
        self.schema
            .get("type")
            .and_then(Value::as_str)
            .and_then(|t| t.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn min_max_follow_declared_type() {
        assert_eq!(
            SchemaBuilder::string().min(2).max(5).build(),
            json!({"type": "string", "minLength": 2, "maxLength": 5})
        );
        assert_eq!(
            SchemaBuilder::array().min(1).build(),
            json!({"type": "array", "minItems": 1})
        );
        assert_eq!(
            SchemaBuilder::object().max(3).build(),
            json!({"type": "object", "maxProperties": 3})
        );
        assert_eq!(SchemaBuilder::new().min(1).build(), json!({}));
    }

    #[test]
    fn numeric_bounds_ignored_for_strings() {
        let schema = SchemaBuilder::string().minimum(1.0).maximum(2.0).build();
        assert_eq!(schema, json!({"type": "string"}));
    }

    #[test]
    fn builds_nested_schema_with_defs() {
        let schema = SchemaBuilder::object()
            .id("root")
            .property("user", SchemaBuilder::reference("#/$defs/Person").build())
            .def(
                "Person",
                SchemaBuilder::object()
                    .property("name", SchemaBuilder::string().build())
                    .build(),
            )
            .build();

        assert_eq!(schema["properties"]["user"]["$ref"], "#/$defs/Person");
        assert_eq!(schema["$defs"]["Person"]["properties"]["name"]["type"], "string");
        assert_eq!(schema["$id"], "root");
    }
}
