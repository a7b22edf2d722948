//! Bulk initial-load sources

use async_trait::async_trait;
use redline_core::effects::{SourceEffects, SourceError};
use redline_core::Document;
use std::path::PathBuf;
use tokio::fs;

/// Loads the initial document from a `{"items": [...]}` JSON file.
///
/// The seed file analog: consulted once per instance, only when durable
/// storage holds no usable projection.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Create a source reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SourceEffects for JsonFileSource {
    async fn load_initial_document(&self) -> Result<Document, SourceError> {
        let bytes = fs::read(&self.path)
            .await
            .map_err(|e| SourceError(format!("read {}: {e}", self.path.display())))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| SourceError(format!("parse {}: {e}", self.path.display())))
    }
}
