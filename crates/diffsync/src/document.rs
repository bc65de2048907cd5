//! The observable document: one owned JSON snapshot, path-addressed
//! mutation through [`path_ops`](crate::path_ops), and synchronous change
//! notification.

use std::fmt;

use serde_json::{Map, Value};

use diffsync_json_pointer::Step;

use crate::path_ops;
use crate::types::ChangeRecord;

/// Capability to unsubscribe a change handler. Obtained from
/// [`Document::on_change`], spent in [`Document::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

struct Handler {
    token: SubscriptionToken,
    func: Box<dyn FnMut(&ChangeRecord)>,
}

/// A mutable JSON-shaped document that records every mutation as granular
/// [`ChangeRecord`]s and delivers them synchronously to subscribers.
///
/// Every mutating operation runs to completion, publishing the new snapshot
/// and invoking each handler once per record, in emission order, before
/// returning. Handlers must not re-enter the document.
///
/// Structurally inconsistent paths never fail: writing through a primitive
/// or wrong-kind container auto-vivifies the required containers.
pub struct Document {
    root: Value,
    handlers: Vec<Handler>,
    next_token: u64,
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.root)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl Document {
    /// An empty document (empty mapping root).
    pub fn new() -> Self {
        Document {
            root: Value::Object(Map::new()),
            handlers: Vec::new(),
            next_token: 0,
        }
    }

    /// A document initialized from a caller-supplied tree.
    pub fn from_value(initial: Value) -> Self {
        Document {
            root: initial,
            handlers: Vec::new(),
            next_token: 0,
        }
    }

    /// The current value at `path`, or `None` if absent.
    pub fn get(&self, path: &[Step]) -> Option<&Value> {
        path_ops::get(&self.root, path)
    }

    /// A deep, fully independent copy of the current snapshot.
    pub fn to_json(&self) -> Value {
        self.root.clone()
    }

    /// Set the node at `path` to `value`, auto-vivifying parents.
    pub fn set(&mut self, path: &[Step], value: Value) {
        let records = path_ops::assign(&mut self.root, path, value);
        self.emit(&records);
    }

    /// Delete the node at `path`. Absent targets are a silent no-op.
    pub fn remove(&mut self, path: &[Step]) {
        let records = path_ops::remove(&mut self.root, path);
        self.emit(&records);
    }

    /// Read the current value at `path` (absent allowed), map it through
    /// `func` exactly once, and [`set`](Document::set) the result.
    pub fn update<F>(&mut self, path: &[Step], func: F)
    where
        F: FnOnce(Option<&Value>) -> Value,
    {
        let next = func(path_ops::get(&self.root, path));
        self.set(path, next);
    }

    /// Replace the snapshot with an empty mapping, emitting one deletion
    /// record per former top-level member.
    pub fn clear(&mut self) {
        let old = std::mem::replace(&mut self.root, Value::Object(Map::new()));
        let records = match old {
            Value::Object(map) => map
                .into_iter()
                .map(|(key, value)| ChangeRecord::delete(vec![Step::Key(key)], value))
                .collect(),
            // Highest index first, same as a sequence shrink.
            Value::Array(arr) => arr
                .into_iter()
                .enumerate()
                .rev()
                .map(|(idx, value)| ChangeRecord::delete(vec![Step::Index(idx)], value))
                .collect(),
            primitive => vec![ChangeRecord::delete(Vec::new(), primitive)],
        };
        self.emit(&records);
    }

    /// Register a change handler, invoked synchronously once per record, in
    /// emission order, for every mutating operation.
    pub fn on_change<F>(&mut self, handler: F) -> SubscriptionToken
    where
        F: FnMut(&ChangeRecord) + 'static,
    {
        let token = SubscriptionToken(self.next_token);
        self.next_token += 1;
        self.handlers.push(Handler {
            token,
            func: Box::new(handler),
        });
        token
    }

    /// Drop the handler registered under `token`. Returns whether a handler
    /// was actually removed.
    pub fn unsubscribe(&mut self, token: SubscriptionToken) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|handler| handler.token != token);
        self.handlers.len() != before
    }

    fn emit(&mut self, records: &[ChangeRecord]) {
        for record in records {
            for handler in self.handlers.iter_mut() {
                (handler.func)(record);
            }
        }
    }
}
