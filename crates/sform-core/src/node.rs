//! Borrowing accessors for the structural keywords of a schema node.

use serde_json::{Map, Value};

/// Shape of an array node's `items` keyword.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemsShape<'a> {
    /// One schema for every element.
    Single(&'a Value),
    /// Positional (tuple) schemas.
    Tuple(&'a [Value]),
}

/// The `$ref` pointer of a node, if it carries one.
pub fn ref_pointer(schema: &Value) -> Option<&str> {
    schema.get("$ref").and_then(Value::as_str)
}

/// The `properties` map of a node.
pub fn properties(schema: &Value) -> Option<&Map<String, Value>> {
    schema.get("properties").and_then(Value::as_object)
}

/// The `items` keyword of a node.
///
/// Boolean `items` (`true`/`false`) carries no element schema and is
/// reported as absent.
pub fn items_shape(schema: &Value) -> Option<ItemsShape<'_>> {
    match schema.get("items")? {
        Value::Array(list) => Some(ItemsShape::Tuple(list.as_slice())),
        item @ Value::Object(_) => Some(ItemsShape::Single(item)),
        _ => None,
    }
}

/// The `$id` of a node.
pub fn schema_id(schema: &Value) -> Option<&str> {
    schema.get("$id").and_then(Value::as_str)
}
