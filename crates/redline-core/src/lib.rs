//! # Redline Core
//!
//! Foundation crate for the Redline edit-session controller: the document
//! domain types, the controller/session state model, the pure change-set
//! engine, and the effect traits for the three external collaborators
//! (durable storage, remote persistence, bulk initial load).
//!
//! This crate contains no runtime behavior: pure data and pure functions,
//! plus trait definitions. Handlers live in `redline-effects`; orchestration
//! lives in `redline-store`, `redline-session`, and `redline-sync`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Change-set computation between a document and a baseline
pub mod diff;

/// Effect traits for external collaborators
pub mod effects;

/// Controller and session state types
pub mod state;

/// Item and document types
pub mod types;

pub use diff::{changed_count, changed_ids};
pub use state::{ControllerState, SessionState};
pub use types::{Document, Item, ItemId};
