//! Interpolation references
//!
//! A [`Reference`] is the symbolic `${target.attribute...}` form that Terraform
//! resolves later. Chained access builds longer references; Terraform supports
//! both `[key]` and `.key` indexing, but dot-separated paths are the form that
//! every provider version accepts, so every segment is joined with a dot.

use core::fmt;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Symbolic path to an attribute of a declared object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    target: String,
    path: Vec<String>,
}

impl Reference {
    /// Reference `attribute` on the object addressed by `target` (e.g. `aws_instance.web`)
    #[must_use]
    #[inline]
    pub fn new<T: Into<String>, A: Into<String>>(target: T, attribute: A) -> Self {
        Self {
            target: target.into(),
            path: vec![attribute.into()],
        }
    }

    /// Access a nested attribute
    #[must_use]
    #[inline]
    pub fn attr(&self, name: &str) -> Self {
        self.push(name.to_owned())
    }

    /// Access a map entry by key
    #[must_use]
    #[inline]
    pub fn key(&self, key: &str) -> Self {
        self.push(key.to_owned())
    }

    /// Access a list element by position
    #[must_use]
    #[inline]
    pub fn index(&self, index: usize) -> Self {
        self.push(index.to_string())
    }

    /// Address of the referenced object
    #[must_use]
    #[inline]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Attribute path below the object
    #[must_use]
    #[inline]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    fn push(&self, segment: String) -> Self {
        let mut path = self.path.clone();
        path.push(segment);
        Self {
            target: self.target.clone(),
            path,
        }
    }
}

impl fmt::Display for Reference {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}.{}}}", self.target, self.path.join("."))
    }
}

impl From<Reference> for Value {
    #[inline]
    fn from(reference: Reference) -> Self {
        Self::String(reference.to_string())
    }
}

impl From<&Reference> for Value {
    #[inline]
    fn from(reference: &Reference) -> Self {
        Self::String(reference.to_string())
    }
}

impl Serialize for Reference {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl PartialEq<str> for Reference {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.to_string() == other
    }
}

impl PartialEq<&str> for Reference {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}
