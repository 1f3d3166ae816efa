//! # Schema Registry
//!
//! A named collection of form schemas plus full JSON Schema (Draft 2020-12)
//! validation of documents against them via the `jsonschema` crate.
//!
//! ## Naming
//!
//! Schemas loaded from a directory are named by file name without the
//! `.schema.json` / `.schema.yaml` / `.schema.yml` suffix, so
//! `person.schema.json` registers as `person`.
//!
//! ## Cross-Schema References
//!
//! References between registered schemas resolve locally: each schema is
//! reachable under its `$id`, its registry name and its file name. The
//! validator never touches the network; an unknown URI resolves to the
//! permissive schema `{}`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use jsonschema::{Retrieve, Uri, ValidationOptions, Validator};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use sform_core::schema_id;

const SCHEMA_SUFFIXES: &[&str] = &[".schema.json", ".schema.yaml", ".schema.yml"];

/// Resolves `$ref` URIs against the registered schemas.
struct LocalSchemaRetriever {
    schemas_by_uri: HashMap<String, Value>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();

        if let Some(value) = self.schemas_by_uri.get(uri_str) {
            return Ok(value.clone());
        }

        // Relative references arrive joined onto a base URI; retry with the
        // last path segment.
        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);
        if let Some(value) = self.schemas_by_uri.get(filename) {
            return Ok(value.clone());
        }

        tracing::debug!(uri = uri_str, "unknown schema URI, using permissive schema");
        Ok(serde_json::json!({}))
    }
}

/// Errors from loading schemas and validating documents.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The document did not conform to the schema.
    #[error("validation failed against schema '{schema_name}':\n{violations}")]
    ValidationFailed {
        /// Registry name of the schema.
        schema_name: String,
        violations: ValidationViolations,
    },

    /// No schema is registered under this name.
    #[error("schema '{0}' is not registered")]
    NotFound(String),

    /// A schema file could not be read or parsed.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoad {
        /// File or directory being loaded.
        schema_name: String,
        reason: String,
    },

    /// A document file could not be read or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        path: String,
        reason: String,
    },

    /// The schema is not valid JSON Schema.
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuild {
        schema_name: String,
        reason: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single validation violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// JSON Pointer to the violating value in the document.
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that failed.
    pub schema_path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// All violations of one validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Named schemas, iterated in name order.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Value>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.schema.json` / `*.schema.yaml` / `*.schema.yml` file in
    /// `dir` (not recursive).
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaLoad`] when the directory or any schema
    /// file cannot be read or parsed.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let dir = dir.as_ref();
        let mut registry = Self::new();

        let entries = std::fs::read_dir(dir).map_err(|e| SchemaError::SchemaLoad {
            schema_name: dir.display().to_string(),
            reason: format!("cannot read schema directory: {e}"),
        })?;

        for entry in entries {
            let path = entry?.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(name) = SCHEMA_SUFFIXES
                .iter()
                .find_map(|suffix| file_name.strip_suffix(suffix))
            else {
                continue;
            };

            let schema = load_document(&path).map_err(|e| SchemaError::SchemaLoad {
                schema_name: file_name.to_string(),
                reason: e.to_string(),
            })?;
            registry.register(name, schema);
        }

        tracing::debug!(dir = %dir.display(), count = registry.len(), "loaded schemas");
        Ok(registry)
    }

    /// Add or replace a schema, returning the one it replaced.
    pub fn register(&mut self, name: impl Into<String>, schema: Value) -> Option<Value> {
        let name = name.into();
        let previous = self.schemas.insert(name.clone(), schema);
        if previous.is_some() {
            tracing::warn!(schema = %name, "schema re-registered, previous definition replaced");
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// Registered names, sorted.
    pub fn list(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// `(name, schema)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.schemas.iter()
    }

    fn build_options(&self) -> ValidationOptions {
        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);

        let mut schemas_by_uri: HashMap<String, Value> = HashMap::new();
        for (name, value) in &self.schemas {
            schemas_by_uri.insert(name.clone(), value.clone());
            schemas_by_uri.insert(format!("{name}.schema.json"), value.clone());
            if let Some(id) = schema_id(value) {
                schemas_by_uri.insert(id.to_string(), value.clone());
            }
        }

        opts.with_retriever(LocalSchemaRetriever { schemas_by_uri });
        opts
    }

    /// Compile the named schema, with every other registered schema
    /// available for `$ref`.
    ///
    /// # Errors
    ///
    /// [`SchemaError::NotFound`] for unknown names,
    /// [`SchemaError::ValidatorBuild`] when the schema does not compile.
    pub fn build_validator(&self, schema_name: &str) -> Result<Validator, SchemaError> {
        let schema = self
            .schemas
            .get(schema_name)
            .ok_or_else(|| SchemaError::NotFound(schema_name.to_string()))?;

        self.build_options()
            .build(schema)
            .map_err(|e| SchemaError::ValidatorBuild {
                schema_name: schema_name.to_string(),
                reason: e.to_string(),
            })
    }

    /// Validate `instance` against the named schema.
    ///
    /// # Errors
    ///
    /// [`SchemaError::ValidationFailed`] carrying every violation, or the
    /// errors of [`build_validator`](Self::build_validator).
    pub fn validate_document(&self, instance: &Value, schema_name: &str) -> Result<(), SchemaError> {
        let validator = self.build_validator(schema_name)?;

        let violations: Vec<Violation> = validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            tracing::debug!(schema = schema_name, count = violations.len(), "document rejected");
            Err(SchemaError::ValidationFailed {
                schema_name: schema_name.to_string(),
                violations: ValidationViolations { violations },
            })
        }
    }

    /// Load a JSON or YAML document and validate it.
    pub fn validate_file(&self, document_path: &Path, schema_name: &str) -> Result<(), SchemaError> {
        let document = load_document(document_path)?;
        self.validate_document(&document, schema_name)
    }
}

/// Read a JSON or YAML document. `.yaml`/`.yml` files are parsed as YAML
/// and converted to JSON; everything else is parsed as JSON.
///
/// # Errors
///
/// [`SchemaError::DocumentLoad`] when the file cannot be read or parsed.
pub fn load_document(path: &Path) -> Result<Value, SchemaError> {
    let load_error = |reason: String| SchemaError::DocumentLoad {
        path: path.display().to_string(),
        reason,
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| load_error(format!("cannot read file: {e}")))?;

    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        "yaml" | "yml" => serde_yaml::from_str(&content)
            .map_err(|e| load_error(format!("invalid YAML: {e}"))),
        _ => serde_json::from_str(&content).map_err(|e| load_error(format!("invalid JSON: {e}"))),
    }
}
