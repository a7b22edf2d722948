//! Canned bulk-load source

use async_trait::async_trait;
use redline_core::effects::{SourceEffects, SourceError};
use redline_core::Document;

/// Returns a fixed document on every load.
#[derive(Debug, Clone, Default)]
pub struct StaticSource(Document);

impl StaticSource {
    /// A source yielding an empty document.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A source yielding `document`.
    pub fn of(document: Document) -> Self {
        Self(document)
    }
}

#[async_trait]
impl SourceEffects for StaticSource {
    async fn load_initial_document(&self) -> Result<Document, SourceError> {
        Ok(self.0.clone())
    }
}
