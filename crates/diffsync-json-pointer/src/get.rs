use serde_json::Value;

use crate::types::Step;

/// Get a value from a JSON document by path.
///
/// Absence is a normal result: a missing node, a key step on a sequence,
/// an index step on a mapping, or any step on a primitive all yield `None`.
pub fn get<'a>(val: &'a Value, path: &[Step]) -> Option<&'a Value> {
    let mut current = val;
    for step in path {
        current = match (current, step) {
            (Value::Object(map), Step::Key(key)) => map.get(key)?,
            (Value::Array(arr), Step::Index(idx)) => arr.get(*idx)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Get a mutable reference to a value in a JSON document by path.
pub fn get_mut<'a>(val: &'a mut Value, path: &[Step]) -> Option<&'a mut Value> {
    let mut current = val;
    for step in path {
        current = match (current, step) {
            (Value::Object(map), Step::Key(key)) => map.get_mut(key)?,
            (Value::Array(arr), Step::Index(idx)) => arr.get_mut(*idx)?,
            _ => return None,
        };
    }
    Some(current)
}
