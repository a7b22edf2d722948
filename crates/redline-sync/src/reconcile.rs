//! The reconciliation step
//!
//! Adopting a foreign projection runs in a fixed order:
//!
//! 1. raise the loop-prevention flag,
//! 2. reinitialize the state machine directly into the incoming controller
//!    state (direct assignment, never transition replay),
//! 3. overwrite the store wholesale, which fires the change watchers
//!    synchronously,
//! 4. clear the flag.
//!
//! Step 2 must complete before step 3: a watcher reacting to the store update
//! must observe a state machine already consistent with the new data.
//! Reversing the order is the defined bug class this module exists to
//! prevent. The flag is cleared by a guard, so a panicking watcher cannot
//! leave the store stuck in sync mode.

use redline_session::EditSession;
use redline_store::projection::decode_document;
use redline_store::{DocumentStore, PersistedProjection, StoreState};

struct SyncFlagGuard<'a>(&'a DocumentStore);

impl Drop for SyncFlagGuard<'_> {
    fn drop(&mut self) {
        self.0.end_sync();
    }
}

/// Adopt a projection written by another instance.
///
/// Never triggers a durability write: the projection is already durable — it
/// arrived from storage.
pub fn reconcile_projection(session: &EditSession, projection: PersistedProjection) {
    let store = session.store().clone();
    store.begin_sync();
    let _guard = SyncFlagGuard(&store);

    session.reinitialize(&projection.session);
    store.adopt(StoreState {
        document: projection.document,
        session: projection.session,
    });

    tracing::debug!("adopted foreign projection");
}

/// Adopt a committed-snapshot write (or removal) by another instance.
///
/// Touches only the session's snapshot mirror, not the store: the published
/// change count travels inside the projection, whose own event follows.
/// Undecodable bytes are logged and skipped rather than clobbering the
/// mirror.
pub fn reconcile_committed(session: &EditSession, value: Option<&[u8]>) {
    match value {
        None => {
            session.set_committed_mirror(None);
            tracing::debug!("foreign cancel cleared the committed snapshot");
        }
        Some(bytes) => match decode_document(bytes) {
            Ok(document) => {
                session.set_committed_mirror(Some(document));
                tracing::debug!("adopted foreign committed snapshot");
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring undecodable committed snapshot");
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redline_core::{ControllerState, SessionState};
    use redline_session::{EditSession, SessionConfig};
    use redline_store::StoreConfig;
    use redline_testkit::{document_of, MemorySubstrate, MockRemote, StaticSource};
    use std::panic::AssertUnwindSafe;
    use std::sync::Arc;

    async fn session_over(substrate: &MemorySubstrate) -> EditSession {
        let session = EditSession::new(
            Arc::new(substrate.attach()),
            Arc::new(MockRemote::new()),
            Arc::new(StaticSource::empty()),
            StoreConfig::default(),
            SessionConfig::local_only(),
        );
        session.init().await.expect("init ok");
        session
    }

    fn editing_projection() -> PersistedProjection {
        let document = document_of(&["foreign"]);
        PersistedProjection {
            document: document.clone(),
            session: SessionState {
                controller: ControllerState::Editing,
                baseline: Some(document),
                change_count: 0,
            },
        }
    }

    #[tokio::test]
    async fn flag_is_cleared_after_reconciliation() {
        let substrate = MemorySubstrate::new();
        let session = session_over(&substrate).await;

        reconcile_projection(&session, editing_projection());

        assert!(!session.store().is_syncing());
        assert!(session.is_editing().expect("query"));
    }

    #[tokio::test]
    async fn flag_is_cleared_even_when_a_watcher_panics() {
        let substrate = MemorySubstrate::new();
        let session = session_over(&substrate).await;
        session.subscribe(|_| panic!("watcher exploded"));

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
            reconcile_projection(&session, editing_projection());
        }));

        assert!(result.is_err());
        assert!(!session.store().is_syncing());
    }

    #[tokio::test]
    async fn undecodable_committed_bytes_leave_the_mirror_alone() {
        let substrate = MemorySubstrate::new();
        let session = session_over(&substrate).await;
        session.set_committed_mirror(Some(document_of(&["kept"])));

        reconcile_committed(&session, Some(b"not json"));

        assert!(session.committed_snapshot().is_some());

        reconcile_committed(&session, None);
        assert!(session.committed_snapshot().is_none());
    }
}
