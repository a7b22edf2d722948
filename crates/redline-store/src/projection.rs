//! Persisted projection codec
//!
//! The projection is the durable form of one instance's state: the document
//! plus the session metadata. The committed snapshot is deliberately outside
//! it — it lives under its own key with its own lifecycle, shared (read,
//! never concurrently mutated) across instances.

use crate::error::StoreError;
use redline_core::{Document, SessionState};
use serde::{Deserialize, Serialize};

/// The durable payload written under the projection key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedProjection {
    /// The working document.
    pub document: Document,
    /// Controller state, working baseline, and published change count.
    pub session: SessionState,
}

impl PersistedProjection {
    /// Encode to the JSON wire form.
    pub fn encode(&self) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec(self).map_err(|e| StoreError::Codec(e.to_string()))
    }

    /// Decode from the JSON wire form.
    pub fn decode(bytes: &[u8]) -> Result<Self, StoreError> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Codec(e.to_string()))
    }
}

/// Encode a committed snapshot for its storage key.
pub fn encode_document(document: &Document) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(document).map_err(|e| StoreError::Codec(e.to_string()))
}

/// Decode a committed snapshot from its storage key.
pub fn decode_document(bytes: &[u8]) -> Result<Document, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Codec(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use redline_core::{ControllerState, Item};

    #[test]
    fn projection_round_trips() {
        let mut document = Document::new();
        document.push(Item::new("a"));
        let projection = PersistedProjection {
            document: document.clone(),
            session: SessionState {
                controller: ControllerState::Editing,
                baseline: Some(document),
                change_count: 1,
            },
        };

        let bytes = projection.encode().expect("encodes");
        let decoded = PersistedProjection::decode(&bytes).expect("decodes");
        assert_eq!(decoded, projection);
    }

    #[test]
    fn garbage_bytes_are_a_codec_error() {
        let err = PersistedProjection::decode(b"not json").expect_err("must fail");
        assert!(matches!(err, StoreError::Codec(_)));
    }
}
