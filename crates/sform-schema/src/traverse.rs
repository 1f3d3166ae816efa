//! # Field Traversal
//!
//! Depth-first walk over a schema that calls a visitor at every node while
//! resolving `$ref` inline.
//!
//! ## Cycle Policy
//!
//! Cycles are tracked per `$defs` pointer, not per tree path. The walker
//! threads the chain of `#/$defs/...` pointers currently being expanded on
//! the way from the traversal root to the current node. When a node's
//! pointer is already in that chain, the node is visited as-is (its `$ref`
//! left unresolved, no descent through it) and a [`CircularRef`] is
//! recorded. Siblings and other branches continue normally.
//!
//! Two fields that reference the same definition therefore each expand
//! fully; only a definition that re-enters itself is cut.
//!
//! `#/properties/...` pointers are resolved without chain tracking; the
//! depth budget bounds them.
//!
//! ## Node Handling
//!
//! | Node                      | Visitor call          | Descent                              |
//! |---------------------------|-----------------------|--------------------------------------|
//! | object                    | once on the object    | each property, path + key            |
//! | array, tuple `items`      | none                  | each item, path + index              |
//! | array, single `items`     | none                  | the item schema, path unchanged      |
//! | anything else             | once                  | none                                 |
//!
//! Single-schema `items` add no path segment, so element fields share the
//! array's path depth. Layout configuration matches on those paths.

use std::borrow::Cow;
use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use sform_core::{items_shape, properties, ref_pointer, ItemsShape, SchemaType};

use crate::resolve::{resolve_schema_ref, DEFAULT_RESOLVE_DEPTH, DEFS_PREFIX};

/// What to do with single-schema array `items`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayItemsMode {
    /// Descend into the item schema at the array's own path.
    #[default]
    Inline,
    /// Do not descend; the array yields [`Traversal::Empty`] without a
    /// visitor call. Elements are added at runtime.
    Skip,
}

/// Traversal knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalOptions {
    /// Descent budget. Zero visits the start node without descending.
    pub max_depth: usize,
    /// Expand `$ref` pointers.
    pub resolve_refs: bool,
    /// Descend into arrays.
    pub include_arrays: bool,
    /// Descend into objects.
    pub include_objects: bool,
    /// Visit primitives. Primitives have no children, so this only exists
    /// for symmetry with the other flags.
    pub include_primitives: bool,
    /// Handling of single-schema `items`.
    pub array_items: ArrayItemsMode,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_RESOLVE_DEPTH,
            resolve_refs: true,
            include_arrays: true,
            include_objects: true,
            include_primitives: true,
            array_items: ArrayItemsMode::Inline,
        }
    }
}

impl TraversalOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_resolve_refs(mut self, resolve_refs: bool) -> Self {
        self.resolve_refs = resolve_refs;
        self
    }

    pub fn with_array_items(mut self, mode: ArrayItemsMode) -> Self {
        self.array_items = mode;
        self
    }
}

/// What the visitor sees at one node.
#[derive(Debug, Clone, Copy)]
pub struct VisitContext<'n> {
    /// The node, `$ref` already resolved when resolution applied.
    pub schema: &'n Value,
    /// Path segments from the traversal root.
    pub path: &'n [String],
    /// The enclosing object or array node.
    pub parent: Option<&'n Value>,
    /// Key of this node in its parent (the array's key for inline items).
    pub parent_key: Option<&'n str>,
}

impl<'n> VisitContext<'n> {
    /// Dot-joined path.
    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    pub fn schema_type(&self) -> SchemaType {
        SchemaType::of(self.schema)
    }

    /// The node as written in its parent, before `$ref` resolution.
    ///
    /// Properties are looked up by key, tuple items by index and inline
    /// items through the array's `items`. Falls back to the resolved node
    /// for the root.
    pub fn raw_schema(&self) -> &'n Value {
        let Some(parent) = self.parent else {
            return self.schema;
        };
        let key = self.path.last();
        if let Some(raw) = properties(parent)
            .zip(key)
            .and_then(|(props, key)| props.get(key))
        {
            return raw;
        }
        match items_shape(parent) {
            Some(ItemsShape::Single(item)) => item,
            Some(ItemsShape::Tuple(items)) => key
                .and_then(|k| k.parse::<usize>().ok())
                .and_then(|index| items.get(index))
                .unwrap_or(self.schema),
            None => self.schema,
        }
    }
}

/// Visitor results, shaped like the schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Traversal<T> {
    /// Visitor result for a node that was not descended into.
    Leaf(T),
    /// One result per property, in declaration order.
    Object(IndexMap<String, Traversal<T>>),
    /// One result per tuple item.
    Tuple(Vec<Traversal<T>>),
    /// Skipped single-schema array.
    Empty,
}

impl<T> Traversal<T> {
    pub fn as_leaf(&self) -> Option<&T> {
        match self {
            Self::Leaf(value) => Some(value),
            _ => None,
        }
    }

    /// All leaf results, depth-first.
    pub fn leaves(&self) -> Vec<&T> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'s>(&'s self, out: &mut Vec<&'s T>) {
        match self {
            Self::Leaf(value) => out.push(value),
            Self::Object(fields) => fields.values().for_each(|f| f.collect_leaves(out)),
            Self::Tuple(items) => items.iter().for_each(|i| i.collect_leaves(out)),
            Self::Empty => {}
        }
    }

    pub fn map<U, F>(self, f: F) -> Traversal<U>
    where
        F: FnMut(T) -> U,
    {
        let mut f = f;
        self.map_inner(&mut f)
    }

    fn map_inner<U, F>(self, f: &mut F) -> Traversal<U>
    where
        F: FnMut(T) -> U,
    {
        match self {
            Self::Leaf(value) => Traversal::Leaf(f(value)),
            Self::Object(fields) => Traversal::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, v.map_inner(f)))
                    .collect(),
            ),
            Self::Tuple(items) => {
                Traversal::Tuple(items.into_iter().map(|i| i.map_inner(f)).collect())
            }
            Self::Empty => Traversal::Empty,
        }
    }
}

impl Traversal<Value> {
    /// Assemble a JSON value: objects for objects, arrays for tuples, `[]`
    /// for skipped arrays.
    pub fn into_value(self) -> Value {
        match self {
            Self::Leaf(value) => value,
            Self::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, v.into_value()))
                    .collect(),
            ),
            Self::Tuple(items) => Value::Array(items.into_iter().map(Self::into_value).collect()),
            Self::Empty => Value::Array(Vec::new()),
        }
    }
}

/// A `$defs` pointer that re-entered its own expansion chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircularRef {
    /// The repeated pointer.
    pub pointer: String,
    /// Dotted path of the node left unexpanded.
    pub path: String,
}

/// Walks a schema tree resolving `$ref` against a fixed root.
#[derive(Debug)]
pub struct SchemaWalker<'r> {
    root: &'r Value,
    options: TraversalOptions,
    circular: Vec<CircularRef>,
}

impl<'r> SchemaWalker<'r> {
    pub fn new(root: &'r Value, options: TraversalOptions) -> Self {
        Self {
            root,
            options,
            circular: Vec::new(),
        }
    }

    pub fn options(&self) -> &TraversalOptions {
        &self.options
    }

    /// Circular `$defs` expansions cut during the last walk.
    pub fn circular_refs(&self) -> &[CircularRef] {
        &self.circular
    }

    /// Walk from the root.
    pub fn walk<T, F>(&mut self, visitor: F) -> Traversal<T>
    where
        F: FnMut(&VisitContext<'_>) -> T,
    {
        let root = self.root;
        self.walk_from(root, visitor)
    }

    /// Walk from `node`, resolving pointers against the root.
    pub fn walk_from<T, F>(&mut self, node: &Value, mut visitor: F) -> Traversal<T>
    where
        F: FnMut(&VisitContext<'_>) -> T,
    {
        self.circular.clear();
        let mut path = Vec::new();
        let mut chain = Vec::new();
        let depth = self.options.max_depth;
        self.visit_node(node, &mut path, None, None, &mut chain, depth, &mut visitor)
    }

    #[allow(clippy::too_many_arguments)]
    fn visit_node<T, F>(
        &mut self,
        node: &Value,
        path: &mut Vec<String>,
        parent: Option<&Value>,
        parent_key: Option<&str>,
        chain: &mut Vec<String>,
        depth: usize,
        visitor: &mut F,
    ) -> Traversal<T>
    where
        F: FnMut(&VisitContext<'_>) -> T,
    {
        if depth == 0 {
            return leaf(visitor, node, path, parent, parent_key);
        }

        let mut pushed = false;
        let resolved: Cow<'_, Value> = match ref_pointer(node) {
            Some(pointer) if self.options.resolve_refs => {
                if !pointer.starts_with(DEFS_PREFIX) {
                    resolve_schema_ref(node, self.root, depth, &mut HashSet::new())
                } else if chain.iter().any(|p| p == pointer) {
                    let dotted = path.join(".");
                    tracing::warn!(
                        pointer,
                        path = %dotted,
                        "circular $def reference, leaving field unexpanded"
                    );
                    self.circular.push(CircularRef {
                        pointer: pointer.to_string(),
                        path: dotted,
                    });
                    Cow::Borrowed(node)
                } else {
                    chain.push(pointer.to_string());
                    pushed = true;
                    resolve_schema_ref(node, self.root, depth, &mut HashSet::new())
                }
            }
            _ => Cow::Borrowed(node),
        };

        let result = self.descend(&resolved, path, parent, parent_key, chain, depth, visitor);
        if pushed {
            chain.pop();
        }
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn descend<T, F>(
        &mut self,
        schema: &Value,
        path: &mut Vec<String>,
        parent: Option<&Value>,
        parent_key: Option<&str>,
        chain: &mut Vec<String>,
        depth: usize,
        visitor: &mut F,
    ) -> Traversal<T>
    where
        F: FnMut(&VisitContext<'_>) -> T,
    {
        let options = self.options;
        match SchemaType::of(schema) {
            SchemaType::Object => {
                if !options.include_objects {
                    return leaf(visitor, schema, path, parent, parent_key);
                }
                let own = visitor(&VisitContext {
                    schema,
                    path: path.as_slice(),
                    parent,
                    parent_key,
                });
                let Some(props) = properties(schema) else {
                    return Traversal::Leaf(own);
                };

                let mut fields = IndexMap::with_capacity(props.len());
                for (key, child) in props {
                    path.push(key.clone());
                    let result = self.visit_node(
                        child,
                        path,
                        Some(schema),
                        Some(key.as_str()),
                        chain,
                        depth - 1,
                        visitor,
                    );
                    path.pop();
                    fields.insert(key.clone(), result);
                }
                Traversal::Object(fields)
            }
            SchemaType::Array => {
                if !options.include_arrays {
                    return leaf(visitor, schema, path, parent, parent_key);
                }
                match items_shape(schema) {
                    Some(ItemsShape::Tuple(items)) => {
                        let mut results = Vec::with_capacity(items.len());
                        for (index, item) in items.iter().enumerate() {
                            let key = index.to_string();
                            path.push(key.clone());
                            results.push(self.visit_node(
                                item,
                                path,
                                Some(schema),
                                Some(key.as_str()),
                                chain,
                                depth - 1,
                                visitor,
                            ));
                            path.pop();
                        }
                        Traversal::Tuple(results)
                    }
                    Some(ItemsShape::Single(item)) => match options.array_items {
                        ArrayItemsMode::Inline => self.visit_node(
                            item,
                            path,
                            Some(schema),
                            parent_key,
                            chain,
                            depth - 1,
                            visitor,
                        ),
                        ArrayItemsMode::Skip => Traversal::Empty,
                    },
                    None => leaf(visitor, schema, path, parent, parent_key),
                }
            }
            _ => leaf(visitor, schema, path, parent, parent_key),
        }
    }
}

fn leaf<T, F>(
    visitor: &mut F,
    schema: &Value,
    path: &[String],
    parent: Option<&Value>,
    parent_key: Option<&str>,
) -> Traversal<T>
where
    F: FnMut(&VisitContext<'_>) -> T,
{
    Traversal::Leaf(visitor(&VisitContext {
        schema,
        path,
        parent,
        parent_key,
    }))
}

/// Walk `schema` with itself as the resolution root.
pub fn traverse_schema_for_fields<T, F>(
    schema: &Value,
    visitor: F,
    options: &TraversalOptions,
) -> Traversal<T>
where
    F: FnMut(&VisitContext<'_>) -> T,
{
    SchemaWalker::new(schema, *options).walk(visitor)
}
