//! Bulk initial-load effect interface

use crate::types::Document;
use async_trait::async_trait;
use thiserror::Error;

/// Failure of the bulk initial-document source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to load initial document: {0}")]
pub struct SourceError(pub String);

/// Pure trait for the bulk initial-load collaborator.
///
/// Invoked once per instance, and only when durable storage has no usable
/// projection (absent or corrupt).
#[async_trait]
pub trait SourceEffects: Send + Sync {
    /// Produce the initial document for a fresh instance.
    async fn load_initial_document(&self) -> Result<Document, SourceError>;
}
