//! JSON Pointer (RFC 6901) utilities over typed path steps.
//!
//! This crate implements the text boundary for path-addressed JSON work:
//! parsing pointer strings into decoded [`Path`]s of [`Step`]s (mapping keys
//! or sequence indices), formatting them back, and navigating documents
//! where absence is a normal result rather than an error.
//!
//! # Example
//!
//! ```
//! use diffsync_json_pointer::{format_json_pointer, get, parse_json_pointer, Step};
//!
//! // Parse a JSON Pointer string into typed steps
//! let path = parse_json_pointer("/foo/0").unwrap();
//! assert_eq!(path, vec![Step::from("foo"), Step::from(0usize)]);
//!
//! // Format the steps back to a pointer string
//! assert_eq!(format_json_pointer(&path), "/foo/0");
//!
//! // Navigate a document
//! let doc = serde_json::json!({"foo": [42]});
//! assert_eq!(get(&doc, &path), Some(&serde_json::json!(42)));
//! ```

use thiserror::Error;

pub mod types;
pub use types::{Path, Step};

mod get;
pub use get::{get, get_mut};

pub mod validate;
pub use validate::validate_path;

mod util;
pub use util::is_valid_index;

/// Errors for malformed pointer text or out-of-bounds paths.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("pointer must start with '/'")]
    MissingLeadingSlash,
    #[error("invalid escape sequence: {0}")]
    InvalidEscape(String),
    #[error("path exceeds maximum depth")]
    PathTooDeep,
    #[error("sequence index too large: {0}")]
    IndexTooLarge(usize),
}

/// Unescapes a JSON Pointer path component.
///
/// Per RFC 6901, `~1` is replaced with `/` and `~0` is replaced with `~`.
///
/// # Example
///
/// ```
/// use diffsync_json_pointer::unescape_component;
///
/// assert_eq!(unescape_component("a~0b"), "a~b");
/// assert_eq!(unescape_component("c~1d"), "c/d");
/// assert_eq!(unescape_component("no-escapes"), "no-escapes");
/// ```
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    // Order matters: ~1 must be replaced before ~0
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a JSON Pointer path component.
///
/// Per RFC 6901, `/` is replaced with `~1` and `~` is replaced with `~0`.
///
/// # Example
///
/// ```
/// use diffsync_json_pointer::escape_component;
///
/// assert_eq!(escape_component("a~b"), "a~0b");
/// assert_eq!(escape_component("c/d"), "c~1d");
/// ```
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    // Order matters: ~ must be escaped before /
    component.replace('~', "~0").replace('/', "~1")
}

/// Parse a JSON Pointer string into a decoded [`Path`].
///
/// The empty string addresses the root. A component that is a canonical
/// non-negative integer (see [`is_valid_index`]) decodes as [`Step::Index`],
/// anything else as [`Step::Key`].
///
/// # Errors
///
/// A non-empty pointer that does not start with `/` is
/// [`PointerError::MissingLeadingSlash`]; a `~` not followed by `0` or `1`
/// is [`PointerError::InvalidEscape`].
///
/// # Example
///
/// ```
/// use diffsync_json_pointer::{parse_json_pointer, Step};
///
/// let path = parse_json_pointer("/a~1b/3/x").unwrap();
/// assert_eq!(
///     path,
///     vec![Step::from("a/b"), Step::from(3usize), Step::from("x")]
/// );
/// assert!(parse_json_pointer("no-slash").is_err());
/// ```
pub fn parse_json_pointer(pointer: &str) -> Result<Path, PointerError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    if !pointer.starts_with('/') {
        return Err(PointerError::MissingLeadingSlash);
    }
    let mut path = Vec::new();
    for component in pointer[1..].split('/') {
        check_escapes(component)?;
        let decoded = unescape_component(component);
        if is_valid_index(&decoded) {
            if let Ok(idx) = decoded.parse::<usize>() {
                path.push(Step::Index(idx));
                continue;
            }
        }
        path.push(Step::Key(decoded));
    }
    Ok(path)
}

/// Format a decoded [`Path`] into a JSON Pointer string.
///
/// # Example
///
/// ```
/// use diffsync_json_pointer::{format_json_pointer, Step};
///
/// let path = vec![Step::from("a/b"), Step::from(3usize)];
/// assert_eq!(format_json_pointer(&path), "/a~1b/3");
/// assert_eq!(format_json_pointer(&[]), "");
/// ```
pub fn format_json_pointer(path: &[Step]) -> String {
    let mut out = String::new();
    for step in path {
        out.push('/');
        match step {
            Step::Key(key) => out.push_str(&escape_component(key)),
            Step::Index(idx) => out.push_str(&idx.to_string()),
        }
    }
    out
}

fn check_escapes(component: &str) -> Result<(), PointerError> {
    let mut chars = component.chars();
    while let Some(ch) = chars.next() {
        if ch != '~' {
            continue;
        }
        match chars.next() {
            Some('0') | Some('1') => {}
            Some(other) => return Err(PointerError::InvalidEscape(format!("~{other}"))),
            None => return Err(PointerError::InvalidEscape("~".to_string())),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_root_pointer() {
        assert_eq!(parse_json_pointer("").unwrap(), Vec::<Step>::new());
    }

    #[test]
    fn parse_distinguishes_keys_and_indices() {
        let path = parse_json_pointer("/users/0/name").unwrap();
        assert_eq!(
            path,
            vec![Step::from("users"), Step::from(0usize), Step::from("name")]
        );
    }

    #[test]
    fn non_canonical_digits_stay_keys() {
        let path = parse_json_pointer("/01/1e3").unwrap();
        assert_eq!(path, vec![Step::from("01"), Step::from("1e3")]);
    }

    #[test]
    fn parse_unescapes_components() {
        let path = parse_json_pointer("/a~0b/c~1d").unwrap();
        assert_eq!(path, vec![Step::from("a~b"), Step::from("c/d")]);
    }

    #[test]
    fn parse_rejects_missing_leading_slash() {
        assert_eq!(
            parse_json_pointer("foo/bar"),
            Err(PointerError::MissingLeadingSlash)
        );
    }

    #[test]
    fn parse_rejects_invalid_escape() {
        assert_eq!(
            parse_json_pointer("/a~2b"),
            Err(PointerError::InvalidEscape("~2".to_string()))
        );
        assert_eq!(
            parse_json_pointer("/a~"),
            Err(PointerError::InvalidEscape("~".to_string()))
        );
    }

    #[test]
    fn empty_components_are_valid_keys() {
        // "/" addresses the "" key, per RFC 6901.
        assert_eq!(parse_json_pointer("/").unwrap(), vec![Step::from("")]);
        assert_eq!(format_json_pointer(&[Step::from("")]), "/");
    }

    #[test]
    fn format_round_trips_parse() {
        for pointer in ["", "/", "/foo/0/b~0a~1r", "/deep/1/x/2"] {
            let path = parse_json_pointer(pointer).unwrap();
            assert_eq!(format_json_pointer(&path), pointer);
        }
    }
}
