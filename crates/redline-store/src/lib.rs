//! # Redline Store
//!
//! The document store: the single authoritative holder of the in-memory
//! document and session state for one instance.
//!
//! - Atomic read ([`DocumentStore::snapshot`]) and functional write
//!   ([`DocumentStore::apply`]): writers compute the next state as a pure
//!   function of the current one, so there are no partial-field races.
//! - Synchronous change notification ([`DocumentStore::watch`]): every
//!   successful write invokes the watchers on the writing call stack with the
//!   new state.
//! - Durability hook: every successful write persists the projection
//!   (document + session state, never the committed snapshot) to durable
//!   storage — unless the write was sourced from the synchronization layer,
//!   guarded by the explicit loop-prevention flag.
//! - Startup read ([`load_or_seed`]): absent or corrupt storage falls back to
//!   the bulk-load collaborator; corrupt bytes are simply overwritten by the
//!   next successful write.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Storage key configuration
pub mod config;

/// Store errors
pub mod error;

/// Persisted projection codec
pub mod projection;

/// The document store
pub mod store;

pub use config::StoreConfig;
pub use error::StoreError;
pub use projection::PersistedProjection;
pub use store::{load_or_seed, DocumentStore, StoreState, WatchId};
