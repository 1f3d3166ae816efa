//! # sform-schema: Schema Engine for Dynamic Forms
//!
//! Turns a JSON Schema (2020-12 subset) into the field list, layout and
//! initial data a dynamic form renders, and checks schemas and data.
//!
//! ## Reference Resolution (`resolve`)
//!
//! [`resolve_schema_ref`] dereferences `#/$defs/<name>` and
//! `#/properties/<path>` pointers, merging sibling keys over the target.
//! It never fails: unresolvable pointers leave the node as it was.
//!
//! ## Field Traversal (`traverse`)
//!
//! [`SchemaWalker`] walks a schema depth-first and calls a visitor at every
//! node. Cycles are tracked per `$defs` pointer along the current descent,
//! so two fields referencing the same definition both expand fully while a
//! definition that re-enters itself is cut at the re-entry point. Sibling
//! branches keep going.
//!
//! ## Field Paths & Layout (`field_path`, `layout`)
//!
//! [`FieldPathResolver`] computes a field's dotted path and `$ref`
//! provenance, memoizing target lookups, and picks the matching
//! [`FieldLayoutConfig`] entry.
//!
//! ## Utilities (`data`, `lint`, `docs`, `registry`)
//!
//! Initial form data, flattening, data checks, schema lint, Markdown docs,
//! and a [`SchemaRegistry`] that validates documents with the `jsonschema`
//! crate.
//!
//! ## Crate Policy
//!
//! - Depends only on `sform-core` internally.
//! - Traversal and resolution log through `tracing` and never return errors.
//! - Only file loading and registry validation surface [`SchemaError`].

pub mod data;
pub mod docs;
pub mod field_path;
pub mod layout;
pub mod lint;
pub mod registry;
pub mod resolve;
pub mod traverse;

pub use data::{
    field_paths, flatten_schema, get_nested_value, initialize_data, schema_at_path,
    set_nested_value, validate_data, zero_value, DataCheck, DataReport, DataViolation,
};
pub use docs::generate_documentation;
pub use field_path::{FieldPathResolver, ResolvedFieldInfo};
pub use layout::{
    get_field_columns, get_field_layout, get_field_span, get_root_columns, get_root_layout,
    FieldLayoutConfig,
};
pub use lint::{find_ref_cycles, lint_registry, lint_schema, LintCode, LintIssue, LintReport};
pub use registry::{load_document, SchemaError, SchemaRegistry, ValidationViolations, Violation};
pub use resolve::{resolve_ref, resolve_schema_ref, RefPointer, DEFAULT_RESOLVE_DEPTH};
pub use traverse::{
    traverse_schema_for_fields, ArrayItemsMode, CircularRef, SchemaWalker, Traversal,
    TraversalOptions, VisitContext,
};
