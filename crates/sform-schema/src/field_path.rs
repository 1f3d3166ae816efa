//! # Field Path Resolution
//!
//! Computes a field's canonical path and `$ref` provenance, and picks the
//! layout rule that applies to it.
//!
//! ## Layout Matching
//!
//! [`FieldPathResolver::find_layout_config`] tries, in order:
//!
//! 1. the exact field path (`user.name`);
//! 2. for `$ref` fields, the parent path joined with the pointer
//!    (`user#/$defs/Person`), so one rule covers every field that
//!    references the same definition;
//! 3. the parent path alone;
//! 4. nothing.
//!
//! ## Cache
//!
//! Pointer targets are memoized per resolver under `"<root $id>:<pointer>"`
//! (`default` when the root has no `$id`). Entries never expire; call
//! [`FieldPathResolver::clear_cache`] before reusing a resolver with a root
//! that changed in place under the same `$id`.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use sform_core::{build_field_path, ref_pointer, schema_id};

use crate::layout::FieldLayoutConfig;

/// A field's path and `$ref` provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedFieldInfo {
    /// Full dotted path, e.g. `user.name`.
    pub field_path: String,
    /// The `$ref` pointer the field came from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,
    /// Dotted path of the parent (`""` at the top level).
    pub parent_path: String,
    /// The field's own key.
    pub field_name: String,
    /// Referenced target for `$ref` fields, otherwise the field schema.
    pub schema: Value,
    pub is_ref_field: bool,
}

impl ResolvedFieldInfo {
    /// Key under which a layout rule for this field is looked up: parent
    /// path + pointer for `$ref` fields, the field path otherwise.
    pub fn layout_key(&self) -> String {
        match (&self.ref_path, self.is_ref_field) {
            (Some(ref_path), true) => format!("{}{}", self.parent_path, ref_path),
            _ => self.field_path.clone(),
        }
    }
}

/// Resolves field paths, memoizing `$ref` targets.
#[derive(Debug, Default)]
pub struct FieldPathResolver {
    ref_cache: HashMap<String, Value>,
}

impl FieldPathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the field `field_key` under `parent_path`.
    ///
    /// `schema` is the field schema as written in its parent; `root` is the
    /// document it belongs to.
    pub fn resolve_field_path(
        &mut self,
        field_key: &str,
        parent_path: &str,
        schema: &Value,
        root: &Value,
    ) -> ResolvedFieldInfo {
        let field_path = build_field_path(parent_path, field_key);
        let ref_info = self.resolve_ref_info(schema, root);
        let is_ref_field = ref_info.is_some();
        let (ref_path, resolved) = match ref_info {
            Some((pointer, target)) => (Some(pointer), target),
            None => (None, schema.clone()),
        };

        ResolvedFieldInfo {
            field_path,
            ref_path,
            parent_path: parent_path.to_string(),
            field_name: field_key.to_string(),
            schema: resolved,
            is_ref_field,
        }
    }

    fn resolve_ref_info(&mut self, schema: &Value, root: &Value) -> Option<(String, Value)> {
        let pointer = ref_pointer(schema)?;
        let cache_key = format!("{}:{}", schema_id(root).unwrap_or("default"), pointer);

        if let Some(cached) = self.ref_cache.get(&cache_key) {
            return Some((pointer.to_string(), cached.clone()));
        }

        match lookup_pointer(pointer, root) {
            Some(target) => {
                self.ref_cache.insert(cache_key, target.clone());
                Some((pointer.to_string(), target.clone()))
            }
            None => {
                tracing::warn!(pointer, "field $ref does not resolve in root schema");
                None
            }
        }
    }

    /// Pick the layout rule for a field. See the module docs for the order.
    pub fn find_layout_config<'c>(
        &self,
        info: &ResolvedFieldInfo,
        configs: &'c [FieldLayoutConfig],
    ) -> Option<&'c FieldLayoutConfig> {
        let by_path = |path: &str| {
            configs
                .iter()
                .find(|c| c.field_path.as_deref() == Some(path))
        };

        if let Some(config) = by_path(&info.field_path) {
            return Some(config);
        }

        if info.is_ref_field && info.ref_path.is_some() {
            if let Some(config) = by_path(&info.layout_key()) {
                return Some(config);
            }
        }

        by_path(&info.parent_path)
    }

    /// Drop every memoized target.
    pub fn clear_cache(&mut self) {
        self.ref_cache.clear();
    }

    /// Number of memoized targets.
    pub fn cache_len(&self) -> usize {
        self.ref_cache.len()
    }
}

/// Walk a `#/...` JSON pointer from the root.
fn lookup_pointer<'r>(pointer: &str, root: &'r Value) -> Option<&'r Value> {
    let rest = pointer.strip_prefix("#/")?;
    root.pointer(&format!("/{rest}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "$id": "test-schema",
            "type": "object",
            "properties": {
                "user": {"$ref": "#/$defs/Person"},
                "manager": {"$ref": "#/$defs/Person"},
                "settings": {
                    "type": "object",
                    "properties": {
                        "notifications": {"type": "object", "properties": {
                            "email": {"type": "boolean"}
                        }}
                    }
                }
            },
            "$defs": {
                "Person": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "title": "Full Name"},
                        "email": {"type": "string", "title": "Email Address"}
                    }
                }
            }
        })
    }

    #[test]
    fn top_level_ref_field() {
        let root = schema();
        let mut resolver = FieldPathResolver::new();
        let info = resolver.resolve_field_path("user", "", &root["properties"]["user"], &root);
        assert_eq!(info.field_path, "user");
        assert_eq!(info.parent_path, "");
        assert_eq!(info.field_name, "user");
        assert!(info.is_ref_field);
        assert_eq!(info.ref_path.as_deref(), Some("#/$defs/Person"));
        assert_eq!(info.schema["properties"]["name"]["title"], "Full Name");
    }

    #[test]
    fn nested_plain_field() {
        let root = schema();
        let mut resolver = FieldPathResolver::new();
        let node = &root["properties"]["settings"]["properties"]["notifications"];
        let info = resolver.resolve_field_path("notifications", "settings", node, &root);
        assert_eq!(info.field_path, "settings.notifications");
        assert!(!info.is_ref_field);
        assert!(info.ref_path.is_none());
        assert_eq!(&info.schema, node);
    }

    #[test]
    fn cache_is_keyed_by_root_id_and_pointer() {
        let root = schema();
        let mut resolver = FieldPathResolver::new();
        let first = resolver.resolve_field_path("user", "", &root["properties"]["user"], &root);
        let second =
            resolver.resolve_field_path("manager", "", &root["properties"]["manager"], &root);
        assert_eq!(resolver.cache_len(), 1);
        assert_eq!(first.schema, second.schema);

        resolver.clear_cache();
        assert_eq!(resolver.cache_len(), 0);
        let third = resolver.resolve_field_path("user", "", &root["properties"]["user"], &root);
        assert_eq!(first.schema, third.schema);
    }

    #[test]
    fn unresolvable_ref_is_not_a_ref_field() {
        let root = schema();
        let mut resolver = FieldPathResolver::new();
        let node = json!({"$ref": "#/$defs/Missing"});
        let info = resolver.resolve_field_path("ghost", "", &node, &root);
        assert!(!info.is_ref_field);
        assert_eq!(info.schema, node);
        assert_eq!(resolver.cache_len(), 0);
    }

    #[test]
    fn layout_match_order() {
        let root = schema();
        let mut resolver = FieldPathResolver::new();
        let user = resolver.resolve_field_path("user", "", &root["properties"]["user"], &root);
        let name = resolver.resolve_field_path("name", "user", &json!({"type": "string"}), &root);
        let nested_ref = resolver.resolve_field_path(
            "boss",
            "team",
            &json!({"$ref": "#/$defs/Person"}),
            &root,
        );

        let configs = vec![
            FieldLayoutConfig::field("user", 2),
            FieldLayoutConfig::field("team#/$defs/Person", 3),
            FieldLayoutConfig::field("team", 4),
        ];

        // exact
        assert_eq!(resolver.find_layout_config(&user, &configs).map(|c| c.columns), Some(2));
        // parent
        assert_eq!(resolver.find_layout_config(&name, &configs).map(|c| c.columns), Some(2));
        // parent + ref beats parent
        assert_eq!(nested_ref.layout_key(), "team#/$defs/Person");
        assert_eq!(
            resolver.find_layout_config(&nested_ref, &configs).map(|c| c.columns),
            Some(3)
        );

        let unmatched = resolver.resolve_field_path("x", "", &json!({"type": "string"}), &root);
        assert!(resolver.find_layout_config(&unmatched, &configs).is_none());
    }

    #[test]
    fn root_rule_does_not_match_top_level_parent() {
        let root = schema();
        let mut resolver = FieldPathResolver::new();
        let info = resolver.resolve_field_path("age", "", &json!({"type": "integer"}), &root);
        let configs = vec![FieldLayoutConfig::root(2)];
        assert!(resolver.find_layout_config(&info, &configs).is_none());
    }
}
