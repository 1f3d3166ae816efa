//! # `$ref` Resolution
//!
//! Dereferences local pointers against the root schema.
//!
//! ## Supported Pointers
//!
//! - `#/$defs/<name>`: a named definition in the root's `$defs`.
//! - `#/properties/<a>/<b>/...`: a property schema, walking `properties`
//!   one segment at a time from the root. Every segment must exist.
//!
//! Segments are JSON-pointer unescaped (`~1` → `/`, `~0` → `~`). Any other
//! pointer form is left unresolved.
//!
//! ## Merge Rule
//!
//! Keys placed next to `$ref` (a `description`, `title`, `examples`, ...)
//! override the same keys of the target. The merged node carries the
//! target's own `$ref`, if any, so chains of definitions keep resolving
//! until the depth budget runs out or a pointer repeats.

use std::borrow::Cow;
use std::collections::HashSet;

use serde_json::{Map, Value};

use sform_core::{properties, ref_pointer, PointerError};

/// Prefix of definition pointers.
pub const DEFS_PREFIX: &str = "#/$defs/";

/// Prefix of property pointers.
pub const PROPERTIES_PREFIX: &str = "#/properties/";

/// Default number of chained dereferences.
pub const DEFAULT_RESOLVE_DEPTH: usize = 10;

/// A parsed local `$ref` pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RefPointer {
    /// `#/$defs/<name>`
    Defs(String),
    /// `#/properties/<segment>/...`
    Properties(Vec<String>),
}

impl RefPointer {
    /// Parse a pointer string.
    ///
    /// # Errors
    ///
    /// Returns [`PointerError`] for empty strings, pointers naming no
    /// target, and pointer forms other than the two supported ones.
    pub fn parse(pointer: &str) -> Result<Self, PointerError> {
        if pointer.is_empty() {
            return Err(PointerError::Empty);
        }

        if let Some(name) = pointer.strip_prefix(DEFS_PREFIX) {
            if name.is_empty() {
                return Err(PointerError::MissingTarget(pointer.to_string()));
            }
            return Ok(Self::Defs(unescape(name)));
        }

        if let Some(rest) = pointer.strip_prefix(PROPERTIES_PREFIX) {
            let segments: Vec<String> = rest.split('/').map(unescape).collect();
            if segments.iter().any(String::is_empty) {
                return Err(PointerError::MissingTarget(pointer.to_string()));
            }
            return Ok(Self::Properties(segments));
        }

        Err(PointerError::Unsupported(pointer.to_string()))
    }

    /// Whether this points into `$defs`.
    pub fn is_def(&self) -> bool {
        matches!(self, Self::Defs(_))
    }

    /// Find the target node under `root`.
    pub fn lookup<'r>(&self, root: &'r Value) -> Option<&'r Value> {
        match self {
            Self::Defs(name) => root.get("$defs")?.get(name),
            Self::Properties(segments) => {
                let mut current = root;
                for segment in segments {
                    current = properties(current)?.get(segment)?;
                }
                Some(current)
            }
        }
    }
}

fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Dereference `schema` against `root` with the default depth and a fresh
/// visited set.
pub fn resolve_ref<'a>(schema: &'a Value, root: &Value) -> Cow<'a, Value> {
    resolve_schema_ref(schema, root, DEFAULT_RESOLVE_DEPTH, &mut HashSet::new())
}

/// Dereference `schema` against `root`.
///
/// Returns `schema` unchanged when it has no `$ref`, when `max_depth` is
/// zero, when its pointer is already in `visited`, or when the pointer
/// cannot be resolved. `visited` holds the pointers of the current
/// resolution chain only; pass a fresh set per call chain.
pub fn resolve_schema_ref<'a>(
    schema: &'a Value,
    root: &Value,
    max_depth: usize,
    visited: &mut HashSet<String>,
) -> Cow<'a, Value> {
    match resolve_owned(schema, root, max_depth, visited) {
        Some(resolved) => Cow::Owned(resolved),
        None => Cow::Borrowed(schema),
    }
}

/// `None` means "leave the input as it is".
fn resolve_owned(
    schema: &Value,
    root: &Value,
    max_depth: usize,
    visited: &mut HashSet<String>,
) -> Option<Value> {
    let pointer = ref_pointer(schema)?;
    if max_depth == 0 {
        return None;
    }

    if !visited.insert(pointer.to_string()) {
        tracing::debug!(pointer, "pointer already visited in this chain, stopping");
        return None;
    }

    let parsed = match RefPointer::parse(pointer) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(pointer, error = %e, "cannot resolve $ref");
            return None;
        }
    };

    let Some(target) = parsed.lookup(root) else {
        tracing::warn!(pointer, "$ref target not found in root schema");
        return None;
    };

    tracing::debug!(pointer, "resolved $ref");
    let merged = merge_siblings(target, schema);
    Some(resolve_owned(&merged, root, max_depth - 1, visited).unwrap_or(merged))
}

/// Target keys first, then every sibling of `$ref` on top.
fn merge_siblings(target: &Value, schema: &Value) -> Value {
    let mut merged = match target {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    if let Value::Object(siblings) = schema {
        for (key, value) in siblings {
            if key != "$ref" {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    Value::Object(merged)
}
