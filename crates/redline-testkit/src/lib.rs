//! Redline Testing Infrastructure
//!
//! Common fixtures to eliminate duplication across test modules:
//! deterministic mock collaborators (remote persistence, bulk-load source)
//! and small factories for items and documents. The memory storage substrate
//! from `redline-effects` is re-exported for convenience — a shared
//! [`MemorySubstrate`] with several attached handlers models several "tabs"
//! over one durable store.
//!
//! ```rust,ignore
//! use redline_testkit::*;
//!
//! let substrate = MemorySubstrate::new();
//! let remote = MockRemote::new();
//! let source = StaticSource::of(document_of(&["a", "b"]));
//! // wire a controller from substrate.attach(), remote, source ...
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod factories;
pub mod remote;
pub mod source;

pub use factories::{completed_item, document_of, item};
pub use remote::MockRemote;
pub use source::StaticSource;

// Re-export the memory substrate for convenience
pub use redline_effects::{MemoryStorageHandler, MemorySubstrate, StorageBus};
