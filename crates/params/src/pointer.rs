//! JSON-pointer style addresses for parameter errors.
//!
//! A [`Pointer`] starts at the parameter name and is deepened by container
//! traversal: array elements add their decimal index, object properties add
//! the property name. Rendering escapes segments per RFC 6901, so a property
//! called `a/b` renders as `a~1b` and `~` renders as `~0`.

use std::fmt;

use serde::{Serialize, Serializer};
use smallvec::SmallVec;

/// One step of a [`Pointer`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Parameter or object property name.
    Key(String),
    /// Array element position.
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => {
                for ch in key.chars() {
                    match ch {
                        '~' => f.write_str("~0")?,
                        '/' => f.write_str("~1")?,
                        other => write!(f, "{other}")?,
                    }
                }
                Ok(())
            }
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Location of an error inside a prepared parameter.
///
/// Pointers produced inside a definition are relative (they start empty) and
/// are prefixed on the way out: first by container traversal, then by the
/// parameter name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pointer {
    segments: SmallVec<[Segment; 4]>,
}

impl Pointer {
    /// The empty pointer, addressing the value itself.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// A pointer to the root of the named parameter (`/<name>`).
    #[must_use]
    pub fn parameter(name: impl Into<String>) -> Self {
        let mut segments = SmallVec::new();
        segments.push(Segment::Key(name.into()));
        Self { segments }
    }

    /// Returns a new pointer one property deeper.
    #[must_use]
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.segments.push(Segment::Key(key.into()));
        next
    }

    /// Returns a new pointer one array element deeper.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.segments.push(Segment::Index(index));
        next
    }

    /// Prepends a property or parameter name.
    #[must_use]
    pub fn prefixed_key(mut self, key: impl Into<String>) -> Self {
        self.segments.insert(0, Segment::Key(key.into()));
        self
    }

    /// Prepends an array index.
    #[must_use]
    pub fn prefixed_index(mut self, index: usize) -> Self {
        self.segments.insert(0, Segment::Index(index));
        self
    }

    /// Whether this pointer addresses the value itself.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segments, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The parameter name this pointer is rooted at, if any.
    #[must_use]
    pub fn parameter_name(&self) -> Option<&str> {
        match self.segments.first() {
            Some(Segment::Key(key)) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl Serialize for Pointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn root_renders_empty() {
        assert_eq!(Pointer::root().to_string(), "");
        assert!(Pointer::root().is_root());
    }

    #[test]
    fn parameter_then_index_then_key() {
        let ptr = Pointer::parameter("items").index(1).key("firstName");
        assert_eq!(ptr.to_string(), "/items/1/firstName");
        assert_eq!(ptr.depth(), 3);
        assert_eq!(ptr.parameter_name(), Some("items"));
    }

    #[test]
    fn prefixing_builds_outward() {
        let ptr = Pointer::root()
            .prefixed_key("firstName")
            .prefixed_index(1)
            .prefixed_key("items");
        assert_eq!(ptr, Pointer::parameter("items").index(1).key("firstName"));
    }

    #[test]
    fn keys_are_escaped_per_rfc6901() {
        let ptr = Pointer::parameter("filter").key("a/b").key("c~d");
        assert_eq!(ptr.to_string(), "/filter/a~1b/c~0d");
    }

    #[test]
    fn tilde_escape_comes_first() {
        // `~1` in a key must not be read back as an escaped slash.
        let ptr = Pointer::parameter("~1");
        assert_eq!(ptr.to_string(), "/~01");
    }

    #[test]
    fn index_root_has_no_parameter_name() {
        assert_eq!(Pointer::root().prefixed_index(3).parameter_name(), None);
    }

    #[test]
    fn serializes_as_string() {
        let ptr = Pointer::parameter("list").index(2);
        assert_eq!(serde_json::to_value(&ptr).unwrap(), serde_json::json!("/list/2"));
    }
}
