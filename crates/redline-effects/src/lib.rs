//! # Redline Effects - Storage and Source Handlers
//!
//! Stateless single-instance implementations of the effect traits from
//! `redline-core`. These handlers provide the durable-storage substrate
//! (memory-backed and filesystem-backed) and the bulk initial-load source.
//!
//! Every storage handler attaches to a [`StorageBus`], the in-process
//! notification channel shared by all instances of one substrate: each
//! successful `set`/`remove` is fanned out to every *other* attached
//! instance, which is what the synchronization layer rides on.
//!
//! No mock handlers here - those belong in `redline-testkit`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// In-process storage notification bus
pub mod bus;

/// Filesystem-backed storage handler
pub mod filesystem;

/// Memory-backed storage handler
pub mod memory;

/// Bulk initial-load sources
pub mod source;

pub use bus::StorageBus;
pub use filesystem::FilesystemStorageHandler;
pub use memory::{MemoryStorageHandler, MemorySubstrate};
pub use source::JsonFileSource;
