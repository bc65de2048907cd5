//! Type definitions for decoded JSON Pointer paths.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single step in a decoded JSON Pointer path.
///
/// A step addresses either a mapping key or a sequence index. The two are
/// kept distinct so consumers can tell which container kind a step expects
/// without re-parsing strings.
///
/// Serde representation is untagged: a JSON string is a `Key`, a JSON
/// non-negative integer is an `Index`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    /// A sequence index.
    Index(usize),
    /// A mapping key.
    Key(String),
}

impl Step {
    /// Returns `true` if this step addresses a mapping key.
    pub fn is_key(&self) -> bool {
        matches!(self, Step::Key(_))
    }

    /// Returns `true` if this step addresses a sequence index.
    pub fn is_index(&self) -> bool {
        matches!(self, Step::Index(_))
    }

    /// The key, if this step is one.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Step::Key(key) => Some(key),
            Step::Index(_) => None,
        }
    }

    /// The index, if this step is one.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Step::Index(idx) => Some(*idx),
            Step::Key(_) => None,
        }
    }
}

impl From<&str> for Step {
    fn from(key: &str) -> Self {
        Step::Key(key.to_string())
    }
}

impl From<String> for Step {
    fn from(key: String) -> Self {
        Step::Key(key)
    }
}

impl From<usize> for Step {
    fn from(idx: usize) -> Self {
        Step::Index(idx)
    }
}

impl fmt::Display for Step {
    /// Renders the raw component, without RFC 6901 escaping.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Key(key) => f.write_str(key),
            Step::Index(idx) => write!(f, "{idx}"),
        }
    }
}

/// A decoded JSON Pointer path. The empty path addresses the root.
pub type Path = Vec<Step>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_kind_predicates() {
        assert!(Step::from("foo").is_key());
        assert!(!Step::from("foo").is_index());
        assert!(Step::from(3usize).is_index());
        assert_eq!(Step::from("foo").as_key(), Some("foo"));
        assert_eq!(Step::from(3usize).as_index(), Some(3));
        assert_eq!(Step::from(3usize).as_key(), None);
    }

    #[test]
    fn step_serde_is_untagged() {
        let key: Step = serde_json::from_str("\"foo\"").unwrap();
        assert_eq!(key, Step::Key("foo".to_string()));
        let idx: Step = serde_json::from_str("2").unwrap();
        assert_eq!(idx, Step::Index(2));
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"foo\"");
        assert_eq!(serde_json::to_string(&idx).unwrap(), "2");
    }

    #[test]
    fn step_display_renders_raw_component() {
        assert_eq!(Step::from("a/b").to_string(), "a/b");
        assert_eq!(Step::from(12usize).to_string(), "12");
    }
}
