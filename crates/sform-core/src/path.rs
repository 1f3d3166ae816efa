//! # Field Paths
//!
//! A field path is the dot-joined sequence of property keys (and tuple
//! indices) that locates a node relative to a traversal root, e.g.
//! `settings.notifications.email`. Layout configuration is keyed by the
//! joined string; traversal works with segments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Display name used when a field has no path (the form root).
pub const DEFAULT_FIELD_NAME: &str = "Field";

/// Separator between path segments.
pub const PATH_SEPARATOR: char = '.';

/// Join a parent path and a field key.
///
/// An empty parent yields the key alone.
pub fn build_field_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}{PATH_SEPARATOR}{key}")
    }
}

/// Last segment of a dotted path, or [`DEFAULT_FIELD_NAME`] when the path
/// is absent or empty.
pub fn field_name(path: Option<&str>) -> &str {
    match path {
        Some(p) if !p.is_empty() => p.rsplit(PATH_SEPARATOR).next().unwrap_or(p),
        _ => DEFAULT_FIELD_NAME,
    }
}

/// Everything before the last segment of a dotted path (`""` for a
/// single-segment path).
pub fn parent_path(path: &str) -> &str {
    match path.rfind(PATH_SEPARATOR) {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Segment form of a field path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// The empty path (the traversal root).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Path segments in order.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A new path with `key` appended.
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.into());
        Self(segments)
    }

    /// The enclosing path, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// The last segment, or `None` at the root.
    pub fn name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Dot-joined string form.
    pub fn to_dotted(&self) -> String {
        self.0.join(".")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{PATH_SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        Ok(Self(s.split(PATH_SEPARATOR).map(str::to_string).collect()))
    }
}

impl From<&[String]> for FieldPath {
    fn from(segments: &[String]) -> Self {
        Self(segments.to_vec())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Building a path from a parent and key then taking its name
        /// returns the key.
        #[test]
        fn name_of_built_path_is_key(
            parent in "([a-z]{1,6}(\\.[a-z]{1,6}){0,3})?",
            key in "[a-z_]{1,8}",
        ) {
            let path = build_field_path(&parent, &key);
            prop_assert_eq!(field_name(Some(&path)), key.as_str());
            prop_assert_eq!(parent_path(&path), parent.as_str());
        }

        /// Display and parse agree for non-empty segments.
        #[test]
        fn display_parse_agree(segments in prop::collection::vec("[a-z0-9]{1,6}", 0..5)) {
            let path = FieldPath::from_segments(segments.clone());
            let parsed: FieldPath = path.to_string().parse().unwrap();
            prop_assert_eq!(parsed.segments(), segments.as_slice());
        }
    }
}
