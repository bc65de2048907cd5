//! Property tests: path round-trips, snapshot independence, and two-engine
//! convergence over generated edit batches.

use diffsync::{Document, Step, SyncEngine};
use proptest::prelude::*;
use serde_json::{json, Value};

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        "[a-d]{1,3}".prop_map(|key| Step::Key(key)),
        (0usize..3).prop_map(Step::Index),
    ]
}

fn path_strategy() -> impl Strategy<Value = Vec<Step>> {
    prop::collection::vec(step_strategy(), 1..4)
}

fn leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        (-1000i64..1000).prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::from),
    ]
}

fn value_strategy() -> impl Strategy<Value = Value> {
    leaf_strategy().prop_recursive(2, 8, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Value::from),
            prop::collection::btree_map("[a-d]{1,3}", inner, 0..3)
                .prop_map(|map| json!(map)),
        ]
    })
}

proptest! {
    /// get(set(p, v), p) == v for arbitrary paths and values.
    #[test]
    fn set_then_get_round_trips(path in path_strategy(), value in value_strategy()) {
        let mut doc = Document::new();
        doc.set(&path, value.clone());
        prop_assert_eq!(doc.get(&path), Some(&value));
    }

    /// Snapshots are structurally equal but fully independent.
    #[test]
    fn snapshots_are_independent(path in path_strategy(), value in value_strategy()) {
        let mut doc = Document::new();
        doc.set(&path, value);
        let snapshot = doc.to_json();
        prop_assert_eq!(&snapshot, &doc.to_json());
        let mut mutated = snapshot.clone();
        mutated = match mutated {
            Value::Object(mut map) => {
                map.insert("__extra".to_string(), json!(true));
                Value::Object(map)
            }
            other => json!({ "wrapped": other }),
        };
        // Mutating the exported copy never leaks back into the document.
        prop_assert_ne!(mutated, doc.to_json());
        prop_assert_eq!(snapshot, doc.to_json());
    }

    /// An already-existing path yields no records from a repeated set of
    /// the same value (diff-before-overwrite).
    #[test]
    fn repeated_set_is_silent(path in path_strategy(), value in value_strategy()) {
        let mut doc = Document::new();
        doc.set(&path, value.clone());
        let mut engine = SyncEngine::new(doc);
        engine.add_peer("peer").unwrap();
        engine.document_mut().set(&path, value);
        prop_assert_eq!(engine.pending_len("peer").unwrap(), 0);
    }

    /// Disjoint concurrent edits on both sides converge in one cycle.
    #[test]
    fn disjoint_edits_converge(
        a_edits in prop::collection::vec((path_strategy(), value_strategy()), 1..5),
        b_edits in prop::collection::vec((path_strategy(), value_strategy()), 1..5),
    ) {
        let mut a = SyncEngine::new(Document::new());
        let mut b = SyncEngine::new(Document::new());
        a.add_peer("b").unwrap();
        b.add_peer("a").unwrap();

        // Confine each side to its own subtree so no edit conflicts.
        for (path, value) in &a_edits {
            let mut scoped = vec![Step::from("a_side")];
            scoped.extend(path.iter().cloned());
            a.document_mut().set(&scoped, value.clone());
        }
        for (path, value) in &b_edits {
            let mut scoped = vec![Step::from("b_side")];
            scoped.extend(path.iter().cloned());
            b.document_mut().set(&scoped, value.clone());
        }

        let request = a.patch_peer("b").unwrap();
        let answer = b.receive("a", request, false).unwrap().unwrap();
        prop_assert!(a.receive("b", answer, false).unwrap().is_none());
        prop_assert_eq!(a.document().to_json(), b.document().to_json());
    }
}
