//! Small predicates shared by pointer parsing.

/// Check if a string is a canonical non-negative integer sequence index.
///
/// Canonical means digits only and no superfluous leading zero, so `"0"` is
/// an index but `"01"` is a plain key.
pub fn is_valid_index(component: &str) -> bool {
    if component.is_empty() {
        return false;
    }
    let bytes = component.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|&b| b.is_ascii_digit())
}
