//! # sform-core: Foundational Types for sform
//!
//! This crate holds the vocabulary shared by every other sform crate. It
//! depends on nothing internal.
//!
//! ## Contents
//!
//! 1. **Field paths.** Dot-joined sequences of property keys (`user.name`)
//!    identify a position in a schema traversal. [`FieldPath`] is the
//!    segment form; [`build_field_path`] and [`field_name`] work on the
//!    joined string form used by layout configuration.
//!
//! 2. **Schema types.** [`SchemaType`] is the closed set of JSON Schema
//!    primitive types. A missing `type` reads as `string` and a type list
//!    reads as its first entry, matching how form renderers pick a widget.
//!
//! 3. **Keyword model.** Schemas are loosely typed JSON. [`SchemaKeyword`]
//!    classifies each keyword into a category-specific variant with a single
//!    [`SchemaKeyword::Unknown`] fallback for anything unrecognized.
//!
//! 4. **Schema builder.** [`SchemaBuilder`] constructs schema literals
//!    fluently for tests and programmatic callers.
//!
//! ## Crate Policy
//!
//! - Schemas are plain `serde_json::Value` trees. No wrapper type owns them.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod builder;
pub mod error;
pub mod keyword;
pub mod node;
pub mod path;
pub mod types;

// Re-export primary types for ergonomic imports.
pub use builder::SchemaBuilder;
pub use error::{PointerError, SformError};
pub use keyword::{classify, keywords, ExclusiveBound, SchemaKeyword};
pub use node::{items_shape, properties, ref_pointer, schema_id, ItemsShape};
pub use path::{build_field_path, field_name, parent_path, FieldPath, DEFAULT_FIELD_NAME};
pub use types::SchemaType;
