//! # Redline Sync
//!
//! The synchronization layer: when the shared storage substrate reports that
//! *another* instance wrote a new projection or committed snapshot, this
//! layer reconciles the local store and state machine to match — without
//! re-triggering a durability write (no write→notify→write cycles) and
//! without ever exposing new data under a stale controller state.
//!
//! Reconciliation is an explicit function ([`reconcile_projection`]) rather
//! than inline event-handler logic, so its ordering guarantees are unit
//! testable without real storage. [`SyncWorker`] is the thin driver that
//! feeds it from the storage event stream.
//!
//! Replay direction is one-way by construction: foreign writes flow into the
//! local instance, never back out.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// The reconciliation step
pub mod reconcile;

/// The storage-event-driven worker
pub mod worker;

pub use reconcile::{reconcile_committed, reconcile_projection};
pub use worker::SyncWorker;
