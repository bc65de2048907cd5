//! Core value types for change tracking and patch exchange.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use diffsync_json_pointer::Path;

// ── Slot ──────────────────────────────────────────────────────────────────

/// The value a change installs at its path.
///
/// `Absent` encodes a deletion. Kept as an explicit variant rather than
/// `Option<Value>` so the serde representation cannot confuse a deletion
/// with an installed JSON `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Slot {
    Value(Value),
    Absent,
}

impl Slot {
    pub fn is_absent(&self) -> bool {
        matches!(self, Slot::Absent)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Slot::Value(value) => Some(value),
            Slot::Absent => None,
        }
    }
}

impl From<Value> for Slot {
    fn from(value: Value) -> Self {
        Slot::Value(value)
    }
}

// ── Prior ─────────────────────────────────────────────────────────────────

/// The value assumed to have been at a change's path before the change.
///
/// `Unknown` means the sender omitted the advisory old value, which disables
/// conflict detection for that record. `Absent` means the sender observed no
/// value there (the change is a creation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Prior {
    Value(Value),
    Absent,
    Unknown,
}

impl Prior {
    pub fn is_known(&self) -> bool {
        !matches!(self, Prior::Unknown)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Prior::Value(value) => Some(value),
            Prior::Absent | Prior::Unknown => None,
        }
    }

    /// Capture a prior from an observed optional value.
    pub fn observed(value: Option<&Value>) -> Self {
        match value {
            Some(value) => Prior::Value(value.clone()),
            None => Prior::Absent,
        }
    }
}

// ── ChangeRecord ──────────────────────────────────────────────────────────

/// One granular, path-addressed edit.
///
/// A record's path always denotes a node that existed or now exists as a
/// direct structural node: container creations carry the *empty* container
/// as `new_val`, with member edits following as separate records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub path: Path,
    pub new_val: Slot,
    pub old_val: Prior,
}

impl ChangeRecord {
    /// A record installing `new_val` over an observed prior.
    pub fn set(path: Path, new_val: Value, old_val: Prior) -> Self {
        ChangeRecord {
            path,
            new_val: Slot::Value(new_val),
            old_val,
        }
    }

    /// A record deleting the node that held `old_val`.
    pub fn delete(path: Path, old_val: Value) -> Self {
        ChangeRecord {
            path,
            new_val: Slot::Absent,
            old_val: Prior::Value(old_val),
        }
    }

    pub fn is_deletion(&self) -> bool {
        self.new_val.is_absent()
    }

    pub fn is_creation(&self) -> bool {
        matches!(self.old_val, Prior::Absent)
    }
}

// ── Patch ─────────────────────────────────────────────────────────────────

/// An ordered sequence of change records sent from one peer to another.
///
/// Order is semantic: later records may rely on containers created by
/// earlier ones, so application must preserve it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch {
    records: Vec<ChangeRecord>,
}

impl Patch {
    pub fn new() -> Self {
        Patch::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, record: ChangeRecord) {
        self.records.push(record);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangeRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }
}

impl From<Vec<ChangeRecord>> for Patch {
    fn from(records: Vec<ChangeRecord>) -> Self {
        Patch { records }
    }
}

impl FromIterator<ChangeRecord> for Patch {
    fn from_iter<I: IntoIterator<Item = ChangeRecord>>(iter: I) -> Self {
        Patch {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Patch {
    type Item = ChangeRecord;
    type IntoIter = std::vec::IntoIter<ChangeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Patch {
    type Item = &'a ChangeRecord;
    type IntoIter = std::slice::Iter<'a, ChangeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
