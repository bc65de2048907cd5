//! Path-addressed mutation with structural change tracking.
//!
//! Pure routines over `serde_json::Value` trees. Every mutation diffs
//! before it overwrites and reports what actually changed as granular
//! [`ChangeRecord`]s: one per created or replaced container along the path,
//! one per differing leaf or removed member within an assigned subtree.

use serde_json::{Map, Value};

use diffsync_json_pointer::{Path, Step};

use crate::types::{ChangeRecord, Prior, Slot};

pub use diffsync_json_pointer::{get, get_mut};

// ── Container kinds ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Mapping,
    Sequence,
}

fn kind_for(step: &Step) -> Kind {
    match step {
        Step::Key(_) => Kind::Mapping,
        Step::Index(_) => Kind::Sequence,
    }
}

fn kind_matches(value: &Value, kind: Kind) -> bool {
    match kind {
        Kind::Mapping => value.is_object(),
        Kind::Sequence => value.is_array(),
    }
}

fn empty_container(kind: Kind) -> Value {
    match kind {
        Kind::Mapping => Value::Object(Map::new()),
        Kind::Sequence => Value::Array(Vec::new()),
    }
}

fn container_record(path: &[Step], kind: Kind, old_val: Prior) -> ChangeRecord {
    ChangeRecord {
        path: path.to_vec(),
        new_val: Slot::Value(empty_container(kind)),
        old_val,
    }
}

fn child_path(path: &[Step], step: Step) -> Path {
    let mut child = path.to_vec();
    child.push(step);
    child
}

// ── ensure_path ───────────────────────────────────────────────────────────

/// Guarantee that every proper prefix of `path` is a container of the kind
/// demanded by the step that follows it: a mapping before a key step, a
/// sequence before an index step.
///
/// Missing containers are created; a prefix holding a primitive or a
/// wrong-kind container is replaced, with the previous value recorded as
/// the change's `old_val`. Returns one record per created or replaced
/// container, outermost first. Prefixes that already hold the right kind
/// yield no record, so an already-fully-existing path returns an empty
/// list and leaves the tree untouched.
///
/// Writing a sequence index beyond the current length pads the intermediate
/// indices with `null`; the padding itself emits no records.
pub fn ensure_path(tree: &mut Value, path: &[Step]) -> Vec<ChangeRecord> {
    let mut records = Vec::new();
    if path.is_empty() {
        return records;
    }
    ensure_root_kind(tree, kind_for(&path[0]), &mut records);
    let mut current = &mut *tree;
    for depth in 0..path.len() - 1 {
        current = ensure_child(
            current,
            &path[..=depth],
            kind_for(&path[depth + 1]),
            &mut records,
        );
    }
    records
}

fn ensure_root_kind(root: &mut Value, kind: Kind, records: &mut Vec<ChangeRecord>) {
    if kind_matches(root, kind) {
        return;
    }
    let old = std::mem::replace(root, empty_container(kind));
    records.push(container_record(&[], kind, Prior::Value(old)));
}

/// Descend one step from an already-ensured parent container, creating or
/// kind-replacing the child so it can hold the next step. `child_full_path`
/// is the path of the child itself (its step is the last element).
fn ensure_child<'a>(
    parent: &'a mut Value,
    child_full_path: &[Step],
    child_kind: Kind,
    records: &mut Vec<ChangeRecord>,
) -> &'a mut Value {
    let step = child_full_path.last().expect("child path is non-empty");
    match (parent, step) {
        (Value::Object(map), Step::Key(key)) => {
            let replaced = match map.get(key) {
                None => Some(Prior::Absent),
                Some(existing) if !kind_matches(existing, child_kind) => {
                    Some(Prior::Value(existing.clone()))
                }
                Some(_) => None,
            };
            if let Some(old_val) = replaced {
                map.insert(key.clone(), empty_container(child_kind));
                records.push(container_record(child_full_path, child_kind, old_val));
            }
            map.get_mut(key).expect("just ensured")
        }
        (Value::Array(arr), Step::Index(idx)) => {
            let idx = *idx;
            let replaced = if idx >= arr.len() {
                // Pad intermediate indices with null; padding emits no records.
                arr.resize(idx.saturating_add(1), Value::Null);
                Some(Prior::Absent)
            } else if !kind_matches(&arr[idx], child_kind) {
                Some(Prior::Value(arr[idx].clone()))
            } else {
                None
            };
            if let Some(old_val) = replaced {
                arr[idx] = empty_container(child_kind);
                records.push(container_record(child_full_path, child_kind, old_val));
            }
            &mut arr[idx]
        }
        _ => unreachable!("parent was ensured as a container for this step"),
    }
}

// ── assign ────────────────────────────────────────────────────────────────

/// Set the node at `path` to `value`, auto-vivifying parents, and report
/// every structural change: the [`ensure_path`] records followed by a
/// recursive diff of the previous value at `path` against `value`.
///
/// Equal subtrees emit nothing; the empty path assigns to the root.
pub fn assign(tree: &mut Value, path: &[Step], value: Value) -> Vec<ChangeRecord> {
    if path.is_empty() {
        let mut records = Vec::new();
        diff_subtree(&mut records, &[], Some(tree), &value);
        *tree = value;
        return records;
    }
    let mut records = ensure_path(tree, path);
    let parent = get_mut(tree, &path[..path.len() - 1]).expect("parents were ensured");
    let step = path.last().expect("non-empty path");
    match (parent, step) {
        (Value::Object(map), Step::Key(key)) => {
            diff_subtree(&mut records, path, map.get(key), &value);
            map.insert(key.clone(), value);
        }
        (Value::Array(arr), Step::Index(idx)) => {
            let idx = *idx;
            if idx >= arr.len() {
                // Pad intermediate indices with null; padding emits no records.
                arr.resize(idx.saturating_add(1), Value::Null);
                diff_subtree(&mut records, path, None, &value);
            } else {
                diff_subtree(&mut records, path, Some(&arr[idx]), &value);
            }
            arr[idx] = value;
        }
        _ => unreachable!("parents were ensured as containers"),
    }
    records
}

// ── remove ────────────────────────────────────────────────────────────────

/// Delete the node at `path`. An absent target is a no-op with zero
/// records; a present target yields exactly one deletion record carrying
/// the removed subtree as `old_val`. Removing a sequence element shifts the
/// elements after it. The empty path replaces the root with `null`.
pub fn remove(tree: &mut Value, path: &[Step]) -> Vec<ChangeRecord> {
    if path.is_empty() {
        let old = std::mem::replace(tree, Value::Null);
        return vec![ChangeRecord::delete(Vec::new(), old)];
    }
    let Some(parent) = get_mut(tree, &path[..path.len() - 1]) else {
        return Vec::new();
    };
    let step = path.last().expect("non-empty path");
    let removed = match (parent, step) {
        (Value::Object(map), Step::Key(key)) => map.shift_remove(key),
        (Value::Array(arr), Step::Index(idx)) if *idx < arr.len() => Some(arr.remove(*idx)),
        _ => None,
    };
    match removed {
        Some(old) => vec![ChangeRecord::delete(path.to_vec(), old)],
        None => Vec::new(),
    }
}

// ── Recursive structural diff ─────────────────────────────────────────────

fn diff_subtree(records: &mut Vec<ChangeRecord>, path: &[Step], old: Option<&Value>, new: &Value) {
    if old == Some(new) {
        return;
    }
    match new {
        Value::Object(new_map) => match old {
            Some(Value::Object(old_map)) => diff_mapping(records, path, Some(old_map), new_map),
            other => {
                records.push(container_record(path, Kind::Mapping, Prior::observed(other)));
                diff_mapping(records, path, None, new_map);
            }
        },
        Value::Array(new_arr) => match old {
            Some(Value::Array(old_arr)) => diff_sequence(records, path, old_arr, new_arr),
            other => {
                records.push(container_record(path, Kind::Sequence, Prior::observed(other)));
                diff_sequence(records, path, &[], new_arr);
            }
        },
        leaf => records.push(ChangeRecord::set(
            path.to_vec(),
            leaf.clone(),
            Prior::observed(old),
        )),
    }
}

fn diff_mapping(
    records: &mut Vec<ChangeRecord>,
    path: &[Step],
    old: Option<&Map<String, Value>>,
    new: &Map<String, Value>,
) {
    if let Some(old_map) = old {
        for (key, old_val) in old_map {
            if !new.contains_key(key) {
                records.push(ChangeRecord::delete(
                    child_path(path, Step::Key(key.clone())),
                    old_val.clone(),
                ));
            }
        }
    }
    for (key, new_val) in new {
        let child = child_path(path, Step::Key(key.clone()));
        diff_subtree(records, &child, old.and_then(|map| map.get(key)), new_val);
    }
}

fn diff_sequence(records: &mut Vec<ChangeRecord>, path: &[Step], old: &[Value], new: &[Value]) {
    for (idx, new_val) in new.iter().enumerate() {
        let child = child_path(path, Step::Index(idx));
        diff_subtree(records, &child, old.get(idx), new_val);
    }
    // Surplus old indices are emitted highest-first so the deletions apply
    // cleanly under shift-on-remove semantics.
    for idx in (new.len()..old.len()).rev() {
        records.push(ChangeRecord::delete(
            child_path(path, Step::Index(idx)),
            old[idx].clone(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p(steps: &[&str]) -> Path {
        steps.iter().map(|s| Step::from(*s)).collect()
    }

    #[test]
    fn ensure_existing_path_is_a_no_op() {
        let mut tree = json!({"a": {"b": {"c": 1}}});
        let before = tree.clone();
        let records = ensure_path(&mut tree, &p(&["a", "b", "c"]));
        assert!(records.is_empty());
        assert_eq!(tree, before);
    }

    #[test]
    fn ensure_creates_one_record_per_missing_container() {
        let mut tree = json!({});
        let records = ensure_path(&mut tree, &p(&["a", "b", "c"]));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].path, p(&["a"]));
        assert_eq!(records[0].new_val, Slot::Value(json!({})));
        assert_eq!(records[0].old_val, Prior::Absent);
        assert_eq!(records[1].path, p(&["a", "b"]));
        assert_eq!(tree, json!({"a": {"b": {}}}));
    }

    #[test]
    fn ensure_counts_only_missing_suffix() {
        let mut tree = json!({"a": {"b": {}}});
        let records = ensure_path(&mut tree, &p(&["a", "b", "c", "d"]));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, p(&["a", "b", "c"]));
    }

    #[test]
    fn ensure_replaces_primitive_intermediates() {
        let mut tree = json!({"a": 5});
        let records = ensure_path(&mut tree, &p(&["a", "b"]));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].old_val, Prior::Value(json!(5)));
        assert_eq!(tree, json!({"a": {}}));
    }

    #[test]
    fn ensure_replaces_wrong_kind_containers() {
        let mut tree = json!({"a": [1, 2]});
        let records = ensure_path(&mut tree, &p(&["a", "b"]));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].old_val, Prior::Value(json!([1, 2])));
        assert_eq!(tree, json!({"a": {}}));
    }

    #[test]
    fn ensure_chooses_sequence_for_index_steps() {
        let mut tree = json!({});
        let path = vec![Step::from("a"), Step::Index(1), Step::from("b")];
        let records = ensure_path(&mut tree, &path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].new_val, Slot::Value(json!([])));
        assert_eq!(records[1].path, vec![Step::from("a"), Step::Index(1)]);
        // Index 0 is padding, not a recorded change.
        assert_eq!(tree, json!({"a": [null, {}]}));
    }

    #[test]
    fn ensure_root_becomes_sequence_for_leading_index() {
        let mut tree = json!({"x": 1});
        let records = ensure_path(&mut tree, &[Step::Index(0), Step::from("k")]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].path, Path::new());
        assert_eq!(records[0].old_val, Prior::Value(json!({"x": 1})));
        assert_eq!(tree, json!([{}]));
    }

    #[test]
    fn assign_decomposes_deep_composite() {
        let mut tree = json!({});
        let records = assign(&mut tree, &p(&["a", "b"]), json!({"c": 1}));
        let paths: Vec<Path> = records.iter().map(|r| r.path.clone()).collect();
        assert_eq!(paths, vec![p(&["a"]), p(&["a", "b"]), p(&["a", "b", "c"])]);
        assert_eq!(records[1].new_val, Slot::Value(json!({})));
        assert_eq!(records[2].new_val, Slot::Value(json!(1)));
        assert_eq!(get(&tree, &p(&["a", "b", "c"])), Some(&json!(1)));
    }

    #[test]
    fn assign_equal_value_emits_nothing() {
        let mut tree = json!({"a": {"b": [1, 2]}});
        let records = assign(&mut tree, &p(&["a"]), json!({"b": [1, 2]}));
        assert!(records.is_empty());
        assert_eq!(tree, json!({"a": {"b": [1, 2]}}));
    }

    #[test]
    fn assign_diffs_mappings_per_key() {
        let mut tree = json!({"a": {"keep": 1, "change": 2, "drop": 3}});
        let records = assign(&mut tree, &p(&["a"]), json!({"keep": 1, "change": 9, "add": 4}));
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], ChangeRecord::delete(p(&["a", "drop"]), json!(3)));
        assert_eq!(
            records[1],
            ChangeRecord::set(p(&["a", "change"]), json!(9), Prior::Value(json!(2)))
        );
        assert_eq!(
            records[2],
            ChangeRecord::set(p(&["a", "add"]), json!(4), Prior::Absent)
        );
        assert_eq!(tree, json!({"a": {"keep": 1, "change": 9, "add": 4}}));
    }

    #[test]
    fn assign_emits_sequence_shrink_highest_first() {
        let mut tree = json!({"a": [1, 2, 3, 4]});
        let records = assign(&mut tree, &p(&["a"]), json!([1, 2]));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].path, vec![Step::from("a"), Step::Index(3)]);
        assert_eq!(records[1].path, vec![Step::from("a"), Step::Index(2)]);
        assert!(records.iter().all(ChangeRecord::is_deletion));
        assert_eq!(tree, json!({"a": [1, 2]}));
    }

    #[test]
    fn assign_composite_over_primitive_records_container_then_leaves() {
        let mut tree = json!({"a": 7});
        let records = assign(&mut tree, &p(&["a"]), json!([true]));
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            ChangeRecord::set(p(&["a"]), json!([]), Prior::Value(json!(7)))
        );
        assert_eq!(records[1].path, vec![Step::from("a"), Step::Index(0)]);
    }

    #[test]
    fn assign_at_root_diffs_in_place() {
        let mut tree = json!({"a": 1, "b": 2});
        let records = assign(&mut tree, &[], json!({"a": 1, "c": 3}));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], ChangeRecord::delete(p(&["b"]), json!(2)));
        assert_eq!(
            records[1],
            ChangeRecord::set(p(&["c"]), json!(3), Prior::Absent)
        );
        assert_eq!(tree, json!({"a": 1, "c": 3}));
    }

    #[test]
    fn assign_past_sequence_end_pads_with_null() {
        let mut tree = json!({"a": []});
        let path = vec![Step::from("a"), Step::Index(2)];
        let records = assign(&mut tree, &path, json!("x"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0], ChangeRecord::set(path, json!("x"), Prior::Absent));
        assert_eq!(tree, json!({"a": [null, null, "x"]}));
    }

    #[test]
    fn remove_absent_target_is_a_no_op() {
        let mut tree = json!({"a": 1});
        assert!(remove(&mut tree, &p(&["b"])).is_empty());
        assert!(remove(&mut tree, &p(&["a", "deep"])).is_empty());
        assert_eq!(tree, json!({"a": 1}));
    }

    #[test]
    fn remove_emits_single_record_with_removed_subtree() {
        let mut tree = json!({"a": {"b": [1, 2]}, "keep": true});
        let records = remove(&mut tree, &p(&["a"]));
        assert_eq!(records, vec![ChangeRecord::delete(p(&["a"]), json!({"b": [1, 2]}))]);
        assert_eq!(tree, json!({"keep": true}));
    }

    #[test]
    fn remove_sequence_element_shifts() {
        let mut tree = json!([10, 20, 30]);
        let records = remove(&mut tree, &[Step::Index(1)]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].old_val, Prior::Value(json!(20)));
        assert_eq!(tree, json!([10, 30]));
    }
}
