//! The storage-event-driven worker
//!
//! Subscribes to the substrate's notification stream (events from *other*
//! instances only) and routes each event to the reconciliation step. The
//! worker never writes to storage: zero durability writes per incoming
//! notification, by construction.

use crate::reconcile::{reconcile_committed, reconcile_projection};
use futures::StreamExt;
use redline_core::effects::{StorageEvent, StorageEventStream};
use redline_session::EditSession;
use redline_store::PersistedProjection;
use tokio::task::JoinHandle;

/// Handle to the background reconciliation task of one instance.
///
/// Dropping the handle stops the task.
pub struct SyncWorker {
    handle: JoinHandle<()>,
}

impl SyncWorker {
    /// Subscribe to the session's storage substrate and start reconciling.
    pub fn spawn(session: EditSession) -> Self {
        let events = session.store().storage().subscribe();
        let handle = tokio::spawn(run(session, events));
        Self { handle }
    }

    /// Stop the worker.
    pub fn shutdown(self) {
        self.handle.abort();
    }
}

impl Drop for SyncWorker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Drive reconciliation from an event stream until it ends.
///
/// Exposed separately from [`SyncWorker::spawn`] so tests can feed a
/// hand-built stream without a runtime-managed task.
pub async fn run(session: EditSession, mut events: StorageEventStream) {
    while let Some(event) = events.next().await {
        handle_event(&session, event);
    }
    tracing::debug!("storage event stream ended, sync worker stopping");
}

/// Route one storage event to the matching reconciliation step.
///
/// Events under foreign keys are ignored; undecodable projections are logged
/// and skipped. Ordering is whatever the substrate delivered — last writer
/// wins, no merge.
pub fn handle_event(session: &EditSession, event: StorageEvent) {
    let config = session.store().config().clone();

    if event.key == config.committed_key() {
        reconcile_committed(session, event.value.as_deref());
    } else if event.key == config.projection_key() {
        match event.value {
            Some(bytes) => match PersistedProjection::decode(&bytes) {
                Ok(projection) => reconcile_projection(session, projection),
                Err(e) => {
                    tracing::warn!(
                        origin = %event.origin,
                        error = %e,
                        "ignoring undecodable foreign projection"
                    );
                }
            },
            None => {
                tracing::debug!(origin = %event.origin, "foreign projection removed, keeping local state");
            }
        }
    } else {
        tracing::trace!(key = %event.key, "ignoring event under foreign key");
    }
}
