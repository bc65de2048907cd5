//! Per-peer differential synchronization over an owned [`Document`].
//!
//! The engine subscribes one fan-out handler to the document: every emitted
//! change record is queued for every registered peer, except the peer whose
//! patch is currently being applied (echo suppression). Patches are
//! exchanged in two-message cycles driven by a per-peer `Idle` /
//! `AwaitingAnswer` state, never by inspecting patch contents.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use diffsync_json_pointer::{validate_path, PointerError};

use crate::document::Document;
use crate::types::{ChangeRecord, Patch, Prior, Slot};

// ── Errors ────────────────────────────────────────────────────────────────

/// Protocol-level caller errors. None of these are retried internally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("unknown peer: {0}")]
    UnknownPeer(String),
    #[error("duplicate peer: {0}")]
    DuplicatePeer(String),
    #[error("sync cycle already in progress for peer: {0}")]
    CycleInProgress(String),
    #[error("malformed path in received patch: {0}")]
    MalformedPath(#[from] PointerError),
}

// ── Peer bookkeeping ──────────────────────────────────────────────────────

/// Per-peer channel state: the pending queue of changes not yet sent, the
/// outstanding-cycle flag, and the document snapshot at the last flush.
struct PeerChannel {
    pending: Vec<ChangeRecord>,
    awaiting_answer: bool,
    last_synced: Value,
}

impl PeerChannel {
    fn new(snapshot: Value) -> Self {
        PeerChannel {
            pending: Vec::new(),
            awaiting_answer: false,
            last_synced: snapshot,
        }
    }
}

struct Shared {
    peers: RefCell<IndexMap<String, PeerChannel>>,
    /// Peer whose patch is currently being applied; its queue is skipped
    /// during fan-out so its own edits are not echoed back.
    muted: RefCell<Option<String>>,
}

// ── Engine ────────────────────────────────────────────────────────────────

/// The synchronization engine for one document.
///
/// Owns the [`Document`] (one engine per document) and a channel per
/// registered peer. All operations are synchronous and run on one logical
/// thread; the engine is deliberately `!Send`.
pub struct SyncEngine {
    doc: Document,
    shared: Rc<Shared>,
}

impl SyncEngine {
    /// Take ownership of `doc` and start fanning its change records into
    /// peer channels.
    pub fn new(mut doc: Document) -> Self {
        let shared = Rc::new(Shared {
            peers: RefCell::new(IndexMap::new()),
            muted: RefCell::new(None),
        });
        let fanout = Rc::clone(&shared);
        doc.on_change(move |record| {
            let muted = fanout.muted.borrow();
            for (id, channel) in fanout.peers.borrow_mut().iter_mut() {
                if muted.as_deref() == Some(id.as_str()) {
                    continue;
                }
                channel.pending.push(record.clone());
            }
        });
        SyncEngine { doc, shared }
    }

    /// The owned document.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Mutable access to the owned document. Mutations made through this
    /// reference fan out to peer channels like any other mutation.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Register a peer channel for `id`.
    pub fn add_peer(&mut self, id: impl Into<String>) -> Result<(), SyncError> {
        let id = id.into();
        let snapshot = self.doc.to_json();
        let mut peers = self.shared.peers.borrow_mut();
        if peers.contains_key(&id) {
            return Err(SyncError::DuplicatePeer(id));
        }
        peers.insert(id, PeerChannel::new(snapshot));
        Ok(())
    }

    /// Drop the peer channel for `id`, discarding its pending records.
    pub fn remove_peer(&mut self, id: &str) -> Result<(), SyncError> {
        self.shared
            .peers
            .borrow_mut()
            .shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| SyncError::UnknownPeer(id.to_string()))
    }

    /// Registered peer ids, in registration order.
    pub fn peer_ids(&self) -> Vec<String> {
        self.shared.peers.borrow().keys().cloned().collect()
    }

    /// Whether a cycle initiated towards `id` is still outstanding.
    pub fn is_awaiting_answer(&self, id: &str) -> Result<bool, SyncError> {
        let peers = self.shared.peers.borrow();
        let channel = peers
            .get(id)
            .ok_or_else(|| SyncError::UnknownPeer(id.to_string()))?;
        Ok(channel.awaiting_answer)
    }

    /// Number of changes queued for `id` and not yet flushed into a patch.
    pub fn pending_len(&self, id: &str) -> Result<usize, SyncError> {
        let peers = self.shared.peers.borrow();
        let channel = peers
            .get(id)
            .ok_or_else(|| SyncError::UnknownPeer(id.to_string()))?;
        Ok(channel.pending.len())
    }

    /// The document snapshot taken when `id`'s pending queue was last
    /// flushed (at registration, `patch_peer`, or answer synthesis).
    ///
    /// Inspection-only bookkeeping for hosts driving cadence or recovery
    /// logic above the core: conflict detection is driven by each record's
    /// advisory old value, never by this snapshot.
    pub fn last_synced(&self, id: &str) -> Result<Value, SyncError> {
        let peers = self.shared.peers.borrow();
        let channel = peers
            .get(id)
            .ok_or_else(|| SyncError::UnknownPeer(id.to_string()))?;
        Ok(channel.last_synced.clone())
    }

    /// Initiate a sync cycle towards `id`: drain its pending queue into a
    /// patch, mark the cycle outstanding, and record the current snapshot.
    ///
    /// An empty pending queue yields an empty patch, which is a legal
    /// "nothing changed" message.
    ///
    /// # Errors
    ///
    /// [`SyncError::UnknownPeer`] for an unregistered id;
    /// [`SyncError::CycleInProgress`] while a cycle towards `id` is
    /// outstanding — callers must feed the answer through
    /// [`receive`](SyncEngine::receive) first.
    pub fn patch_peer(&mut self, id: &str) -> Result<Patch, SyncError> {
        let snapshot = self.doc.to_json();
        let mut peers = self.shared.peers.borrow_mut();
        let channel = peers
            .get_mut(id)
            .ok_or_else(|| SyncError::UnknownPeer(id.to_string()))?;
        if channel.awaiting_answer {
            return Err(SyncError::CycleInProgress(id.to_string()));
        }
        let patch: Patch = std::mem::take(&mut channel.pending).into();
        channel.awaiting_answer = true;
        channel.last_synced = snapshot;
        Ok(patch)
    }

    /// Apply a patch received from `id`, resolving conflicts by
    /// `prefer_remote`, then complete or answer the cycle.
    ///
    /// A record conflicts when its advisory old value is known and the
    /// current local value at its path differs — a local edit happened
    /// after the sender's view was taken. Conflicting records are applied
    /// only when `prefer_remote`; otherwise they are dropped and the local
    /// value is retained. A record whose old value is `Unknown` is applied
    /// unconditionally.
    ///
    /// Returns `None` when the patch answers a cycle this side initiated
    /// (locally pending records stay queued for the next cycle), or
    /// `Some(answer)` when the patch is an unsolicited request — the answer
    /// drains the pending queue but leaves this side idle, since it did not
    /// initiate.
    ///
    /// Patches arrive from across a process boundary, so every record path
    /// is checked against the pointer crate's resource limits *before* any
    /// record is applied: a patch carrying an over-deep path or an
    /// oversized sequence index is rejected whole with
    /// [`SyncError::MalformedPath`], leaving the document and the peer
    /// channel untouched.
    pub fn receive(
        &mut self,
        id: &str,
        patch: Patch,
        prefer_remote: bool,
    ) -> Result<Option<Patch>, SyncError> {
        let was_awaiting = {
            let peers = self.shared.peers.borrow();
            let channel = peers
                .get(id)
                .ok_or_else(|| SyncError::UnknownPeer(id.to_string()))?;
            channel.awaiting_answer
        };
        for record in &patch {
            validate_path(&record.path)?;
        }
        for record in &patch {
            let conflicted = match &record.old_val {
                Prior::Unknown => false,
                Prior::Absent => self.doc.get(&record.path).is_some(),
                Prior::Value(expected) => self.doc.get(&record.path) != Some(expected),
            };
            if conflicted && !prefer_remote {
                continue;
            }
            self.apply_from(id, record);
        }
        let snapshot = self.doc.to_json();
        let mut peers = self.shared.peers.borrow_mut();
        let channel = peers.get_mut(id).expect("registration checked above");
        if was_awaiting {
            // This patch answers our outstanding request: the cycle closes.
            channel.awaiting_answer = false;
            Ok(None)
        } else {
            // Unsolicited request: synthesize the answer without becoming
            // an initiator ourselves.
            channel.last_synced = snapshot;
            let answer: Patch = std::mem::take(&mut channel.pending).into();
            Ok(Some(answer))
        }
    }

    /// Apply one record through the document with fan-out towards `id`
    /// suppressed, so the originator never sees its own edit again.
    fn apply_from(&mut self, id: &str, record: &ChangeRecord) {
        *self.shared.muted.borrow_mut() = Some(id.to_string());
        match &record.new_val {
            Slot::Value(value) => self.doc.set(&record.path, value.clone()),
            Slot::Absent => self.doc.remove(&record.path),
        }
        *self.shared.muted.borrow_mut() = None;
    }
}
