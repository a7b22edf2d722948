//! Store errors

use redline_core::effects::{SourceError, StorageError};
use thiserror::Error;

/// Errors surfaced by the document store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The durable storage collaborator failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The bulk-load collaborator failed during seeding.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A projection or snapshot failed to encode or decode.
    ///
    /// Decode failures are handled inside the load path (corruption falls
    /// back to seeding) and never escape it; this variant reaches callers
    /// only from the encode side.
    #[error("projection codec error: {0}")]
    Codec(String),
}
