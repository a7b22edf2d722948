//! Remote persistence effect interface

use crate::types::Document;
use async_trait::async_trait;
use thiserror::Error;

/// Failure of the remote persistence service.
///
/// The controller treats every non-success uniformly as "local-only for now";
/// the reason is carried for logging only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("remote persistence unavailable: {reason}")]
pub struct RemoteError {
    /// Human-readable failure description.
    pub reason: String,
}

impl RemoteError {
    /// Create a remote error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Pure trait for the remote persistence collaborator.
///
/// One operation, idempotent, accepting the full document; no partial-write
/// semantics are required of the caller.
#[async_trait]
pub trait RemoteEffects: Send + Sync {
    /// Push the full document to the remote service.
    async fn persist(&self, document: &Document) -> Result<(), RemoteError>;
}
