//! Deterministic mock of the remote persistence collaborator

use async_trait::async_trait;
use redline_core::effects::{RemoteEffects, RemoteError};
use redline_core::Document;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MockRemoteState {
    pushes: Vec<Document>,
    failing: bool,
}

/// Records every pushed document; can be toggled into a failing mode to
/// exercise the local-only commit path.
#[derive(Clone, Default)]
pub struct MockRemote {
    state: Arc<Mutex<MockRemoteState>>,
}

impl MockRemote {
    /// A remote that accepts every push.
    pub fn new() -> Self {
        Self::default()
    }

    /// A remote that rejects every push.
    pub fn failing() -> Self {
        let remote = Self::new();
        remote.set_failing(true);
        remote
    }

    /// Toggle failure mode.
    pub fn set_failing(&self, failing: bool) {
        self.state.lock().expect("mock remote lock").failing = failing;
    }

    /// Number of successful pushes recorded.
    pub fn push_count(&self) -> usize {
        self.state.lock().expect("mock remote lock").pushes.len()
    }

    /// The most recently pushed document, if any.
    pub fn last_push(&self) -> Option<Document> {
        self.state
            .lock()
            .expect("mock remote lock")
            .pushes
            .last()
            .cloned()
    }
}

#[async_trait]
impl RemoteEffects for MockRemote {
    async fn persist(&self, document: &Document) -> Result<(), RemoteError> {
        let mut state = self.state.lock().expect("mock remote lock");
        if state.failing {
            return Err(RemoteError::new("mock remote is failing"));
        }
        state.pushes.push(document.clone());
        Ok(())
    }
}
