//! diffsync — differential synchronization core for JSON documents.
//!
//! Independent peers each hold a local [`Document`] and converge through
//! repeated bilateral exchanges of small [`Patch`]es: only the changes
//! accumulated since the last successful exchange with a given peer travel,
//! never whole documents. Conflicts are resolved by a caller-chosen policy
//! at [`SyncEngine::receive`] time.
//!
//! Transport, wire encoding, peer discovery, and authentication are caller
//! concerns: the core produces and consumes value-level patches (all serde
//! serializable) and peer ids are opaque tokens.
//!
//! # Example
//!
//! ```
//! use diffsync::{Document, SyncEngine};
//! use diffsync_json_pointer::parse_json_pointer;
//! use serde_json::json;
//!
//! let mut alice = SyncEngine::new(Document::new());
//! let mut bob = SyncEngine::new(Document::new());
//! alice.add_peer("bob").unwrap();
//! bob.add_peer("alice").unwrap();
//!
//! let path = parse_json_pointer("/greeting").unwrap();
//! alice.document_mut().set(&path, json!("hello"));
//!
//! // One full cycle: request out, answer back.
//! let request = alice.patch_peer("bob").unwrap();
//! let answer = bob.receive("alice", request, false).unwrap().unwrap();
//! assert!(alice.receive("bob", answer, false).unwrap().is_none());
//!
//! assert_eq!(alice.document().to_json(), bob.document().to_json());
//! ```

pub mod document;
pub mod path_ops;
pub mod sync;
pub mod types;

pub use document::{Document, SubscriptionToken};
pub use sync::{SyncEngine, SyncError};
pub use types::{ChangeRecord, Patch, Prior, Slot};

pub use diffsync_json_pointer::{Path, PointerError, Step};
