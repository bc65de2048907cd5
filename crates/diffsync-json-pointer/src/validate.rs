//! Validation limits for decoded paths.

use crate::types::Step;
use crate::PointerError;

/// Maximum allowed path depth.
const MAX_PATH_LENGTH: usize = 256;

/// Maximum allowed sequence index.
const MAX_SEQUENCE_INDEX: usize = 65_536;

/// Validate a decoded path against the crate's resource limits.
///
/// Untrusted paths (anything that crossed a process boundary) should pass
/// through here before being used to mutate a document: an index step is a
/// dense-allocation request, so it is bounded the same way path depth is.
///
/// # Errors
///
/// Returns [`PointerError::PathTooDeep`] if the path exceeds the maximum
/// depth (256 steps), or [`PointerError::IndexTooLarge`] if an index step
/// exceeds the maximum sequence index (65 536).
///
/// # Example
///
/// ```
/// use diffsync_json_pointer::{validate_path, Step};
///
/// validate_path(&[]).unwrap(); // Root is valid
/// validate_path(&[Step::from("foo"), Step::from(0usize)]).unwrap();
/// validate_path(&[Step::from(usize::MAX)]).unwrap_err();
/// ```
pub fn validate_path(path: &[Step]) -> Result<(), PointerError> {
    if path.len() > MAX_PATH_LENGTH {
        return Err(PointerError::PathTooDeep);
    }
    for step in path {
        if let Step::Index(idx) = step {
            if *idx > MAX_SEQUENCE_INDEX {
                return Err(PointerError::IndexTooLarge(*idx));
            }
        }
    }
    Ok(())
}
