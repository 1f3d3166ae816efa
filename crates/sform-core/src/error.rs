//! # Error Types
//!
//! Errors shared across sform. All errors use `thiserror` for derive-based
//! `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Traversal and `$ref` resolution never fail outright. Where they hit a
//!   bad pointer they log and degrade; [`PointerError`] exists so the reason
//!   can still be named in the log line.
//! - Malformed schema input that a caller explicitly asked to interpret
//!   (e.g. parsing a type name) surfaces as [`SformError::InvalidSchema`].

use thiserror::Error;

/// Top-level error type for sform.
#[derive(Error, Debug)]
pub enum SformError {
    /// The schema is structurally unusable for the requested operation.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

/// Why a `$ref` pointer string is not resolvable by sform.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointerError {
    /// The pointer string is empty.
    #[error("empty $ref pointer")]
    Empty,

    /// The pointer uses a form other than `#/$defs/<name>` or `#/properties/<path>`.
    #[error("unsupported $ref pointer '{0}': only #/$defs/<name> and #/properties/<path> are resolved")]
    Unsupported(String),

    /// The pointer names a supported location but no target inside it.
    #[error("$ref pointer '{0}' names no target")]
    MissingTarget(String),
}
