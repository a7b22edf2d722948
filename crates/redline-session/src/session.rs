//! The edit-session controller
//!
//! A finite-state machine cycling between `Viewing` and `Editing` for the
//! life of the instance; there is no terminal state. Each transition is
//! atomic and synchronous with respect to the store. The controller owns the
//! committed snapshot — the durable, cross-session reference point for the
//! uncommitted-change count — and the working baseline used for cancel
//! restoration.
//!
//! Snapshots are always deep copies, never references: mutating the live
//! document can never reach into a snapshot.

// Lock poisoning from panics is unrecoverable here, so expect() is the
// appropriate handling pattern.
#![allow(clippy::expect_used)]

use crate::config::SessionConfig;
use crate::error::{CommitOutcome, SessionError};
use redline_core::diff::changed_count;
use redline_core::effects::{RemoteEffects, SourceEffects, StorageEffects};
use redline_core::{ControllerState, Document, Item, ItemId, SessionState};
use redline_store::projection::encode_document;
use redline_store::{load_or_seed, DocumentStore, StoreConfig, StoreState, WatchId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

struct SessionInner {
    store: DocumentStore,
    remote: Arc<dyn RemoteEffects>,
    source: Arc<dyn SourceEffects>,
    config: SessionConfig,
    /// In-memory mirror of the durable committed snapshot.
    committed: RwLock<Option<Document>>,
    /// Whether the committed snapshot was established by the current run of
    /// sessions without any commit ever advancing it. Only a fresh snapshot
    /// is cleared by cancel.
    committed_fresh: AtomicBool,
    initialized: AtomicBool,
}

/// The edit-session controller: the full API surface consumed by a rendering
/// layer.
///
/// Constructed once per instance and passed by reference to all consumers;
/// clones share state. Call [`init`](Self::init) before anything else — every
/// other operation fails with [`SessionError::NotInitialized`] until the
/// one-time setup has completed.
#[derive(Clone)]
pub struct EditSession {
    inner: Arc<SessionInner>,
}

impl EditSession {
    /// Wire a controller from its collaborators. No IO happens here.
    pub fn new(
        storage: Arc<dyn StorageEffects>,
        remote: Arc<dyn RemoteEffects>,
        source: Arc<dyn SourceEffects>,
        store_config: StoreConfig,
        config: SessionConfig,
    ) -> Self {
        let store = DocumentStore::new(
            storage,
            store_config,
            StoreState::viewing(Document::new()),
        );
        Self {
            inner: Arc::new(SessionInner {
                store,
                remote,
                source,
                config,
                committed: RwLock::new(None),
                committed_fresh: AtomicBool::new(false),
                initialized: AtomicBool::new(false),
            }),
        }
    }

    /// One-time setup: read the persisted projection and committed snapshot,
    /// falling back to the bulk-load collaborator when storage is empty or
    /// corrupt. Idempotent; concurrent API calls before completion are
    /// rejected, the instance is fully usable afterwards.
    pub async fn init(&self) -> Result<(), SessionError> {
        if self.inner.initialized.load(Ordering::Acquire) {
            return Ok(());
        }
        let (state, committed) = load_or_seed(
            self.inner.store.storage(),
            self.inner.store.config(),
            &self.inner.source,
        )
        .await?;
        *self
            .inner
            .committed
            .write()
            .expect("session lock poisoned") = committed;
        self.inner.store.adopt(state);
        self.inner.initialized.store(true, Ordering::Release);
        tracing::debug!("controller initialized");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Atomic read of the full current state.
    pub fn state(&self) -> Result<StoreState, SessionError> {
        self.ensure_initialized("state")?;
        Ok(self.inner.store.snapshot())
    }

    /// Whether the controller is in `Editing`.
    pub fn is_editing(&self) -> Result<bool, SessionError> {
        Ok(self.state()?.session.controller.is_editing())
    }

    /// Whether mutations are currently legal (alias of [`is_editing`](Self::is_editing)).
    pub fn can_mutate_now(&self) -> Result<bool, SessionError> {
        self.is_editing()
    }

    /// Whether this instance may push to the remote persistence service.
    ///
    /// Reports the capability gate only; the state gate is observable via
    /// [`is_editing`](Self::is_editing). `commit` checks both.
    pub fn can_commit_now(&self) -> Result<bool, SessionError> {
        self.ensure_initialized("can_commit_now")?;
        Ok(self.inner.config.remote_capability)
    }

    /// The published uncommitted-change count.
    pub fn uncommitted_count(&self) -> Result<usize, SessionError> {
        Ok(self.state()?.session.change_count)
    }

    /// A deep copy of the current committed snapshot, if one exists.
    pub fn committed_snapshot(&self) -> Option<Document> {
        self.inner
            .committed
            .read()
            .expect("session lock poisoned")
            .clone()
    }

    /// Register a listener invoked synchronously after every state change.
    ///
    /// Registration is permitted before `init`; the listener then observes
    /// the initial state installation as its first notification.
    pub fn subscribe<F>(&self, listener: F) -> WatchId
    where
        F: Fn(&StoreState) + Send + Sync + 'static,
    {
        self.inner.store.watch(listener)
    }

    /// Remove a listener registered with [`subscribe`](Self::subscribe).
    pub fn unsubscribe(&self, id: WatchId) -> bool {
        self.inner.store.unwatch(id)
    }

    /// The underlying document store (consumed by the synchronization layer).
    pub fn store(&self) -> &DocumentStore {
        &self.inner.store
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// `Viewing` → `Editing`: open a mutation window.
    ///
    /// Deep-copies the current document into the working baseline. If no
    /// committed snapshot exists yet, the current document also becomes the
    /// durable committed baseline — the first edit session establishes it —
    /// and is marked fresh.
    pub async fn enter_edit(&self) -> Result<(), SessionError> {
        self.ensure_initialized("enter_edit")?;
        let current = self.inner.store.snapshot();
        if current.session.controller.is_editing() {
            return Err(self.rejected_transition("enter_edit", current.session.controller));
        }

        let needs_snapshot = self
            .inner
            .committed
            .read()
            .expect("session lock poisoned")
            .is_none();
        if needs_snapshot {
            self.persist_committed(&current.document).await?;
            *self
                .inner
                .committed
                .write()
                .expect("session lock poisoned") = Some(current.document.clone());
            self.inner.committed_fresh.store(true, Ordering::Release);
        }

        let baseline = current.document.clone();
        let change_count = self.recompute_count(&current.document);
        self.inner
            .store
            .apply(move |state| StoreState {
                document: state.document.clone(),
                session: SessionState {
                    controller: ControllerState::Editing,
                    baseline: Some(baseline),
                    change_count,
                },
            })
            .await?;
        tracing::debug!(established_snapshot = needs_snapshot, "entered edit session");
        Ok(())
    }

    /// `Editing` → `Viewing`, discarding this session's mutations.
    ///
    /// Restores the document from the working baseline. The committed
    /// snapshot is cleared only when it is still fresh — established by this
    /// run of sessions and never advanced by a commit; otherwise it stays so
    /// future sessions keep comparing against the last real commit.
    pub async fn cancel(&self) -> Result<(), SessionError> {
        self.ensure_initialized("cancel")?;
        let current = self.inner.store.snapshot();
        if !current.session.controller.is_editing() {
            return Err(self.rejected_transition("cancel", current.session.controller));
        }

        let restored = current
            .session
            .baseline
            .unwrap_or_else(|| current.document.clone());

        if self.inner.committed_fresh.swap(false, Ordering::AcqRel) {
            self.inner
                .store
                .storage()
                .remove(&self.inner.store.config().committed_key())
                .await
                .map_err(redline_store::StoreError::from)?;
            *self
                .inner
                .committed
                .write()
                .expect("session lock poisoned") = None;
            tracing::debug!("cleared fresh committed snapshot on cancel");
        }

        let change_count = self.recompute_count(&restored);
        self.inner
            .store
            .apply(move |_| StoreState {
                document: restored,
                session: SessionState {
                    controller: ControllerState::Viewing,
                    baseline: None,
                    change_count,
                },
            })
            .await?;
        tracing::debug!("canceled edit session");
        Ok(())
    }

    /// `Editing` → `Viewing`, keeping this session's mutations.
    ///
    /// The document is already durable through the write path; the committed
    /// snapshot and the change count are deliberately untouched — a local
    /// save is not a commit, and uncommitted-count tracking continues across
    /// it.
    pub async fn save_local(&self) -> Result<(), SessionError> {
        self.ensure_initialized("save_local")?;
        let current = self.inner.store.snapshot();
        if !current.session.controller.is_editing() {
            return Err(self.rejected_transition("save_local", current.session.controller));
        }

        self.inner
            .store
            .apply(move |state| StoreState {
                document: state.document.clone(),
                session: SessionState {
                    controller: ControllerState::Viewing,
                    baseline: None,
                    change_count: state.session.change_count,
                },
            })
            .await?;
        tracing::debug!("saved locally, change tracking continues");
        Ok(())
    }

    /// `Editing` → `Viewing`, committing this session's mutations.
    ///
    /// Requires the remote capability — without it the call rejects with no
    /// state change and the caller should use [`save_local`](Self::save_local).
    /// The committed snapshot advances and the transition completes *before*
    /// the remote push is awaited: the local durable record is the source of
    /// truth, a remote outage can never strand the controller in `Editing`,
    /// and the push response is a pure side effect that selects the outcome.
    pub async fn commit(&self) -> Result<CommitOutcome, SessionError> {
        self.ensure_initialized("commit")?;
        if !self.inner.config.remote_capability {
            tracing::warn!("commit rejected: no remote capability, use save_local");
            return Err(SessionError::CapabilityMissing);
        }
        let current = self.inner.store.snapshot();
        if !current.session.controller.is_editing() {
            return Err(self.rejected_transition("commit", current.session.controller));
        }

        let document = current.document.clone();
        self.persist_committed(&document).await?;
        *self
            .inner
            .committed
            .write()
            .expect("session lock poisoned") = Some(document.clone());
        self.inner.committed_fresh.store(false, Ordering::Release);

        self.inner
            .store
            .apply(move |state| StoreState {
                document: state.document.clone(),
                session: SessionState {
                    controller: ControllerState::Viewing,
                    baseline: None,
                    change_count: 0,
                },
            })
            .await?;

        match self.inner.remote.persist(&document).await {
            Ok(()) => {
                tracing::debug!(items = document.len(), "committed to remote");
                Ok(CommitOutcome::Committed)
            }
            Err(e) => {
                tracing::warn!(error = %e, "remote persist failed, commit is local-only");
                Ok(CommitOutcome::LocalOnly { reason: e.reason })
            }
        }
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Append a new, incomplete item. Returns its id.
    pub async fn add_item(&self, text: impl Into<String>) -> Result<ItemId, SessionError> {
        let item = Item::new(text);
        let id = item.id;
        self.mutate("add_item", move |document| {
            document.push(item);
            Ok(())
        })
        .await?;
        Ok(id)
    }

    /// Flip an item's completion flag.
    pub async fn toggle_item(&self, id: ItemId) -> Result<(), SessionError> {
        self.mutate("toggle_item", move |document| {
            let item = document
                .get_mut(id)
                .ok_or(SessionError::UnknownItem { id })?;
            item.completed = !item.completed;
            Ok(())
        })
        .await
    }

    /// Remove an item.
    pub async fn delete_item(&self, id: ItemId) -> Result<(), SessionError> {
        self.mutate("delete_item", move |document| {
            document
                .remove(id)
                .map(|_| ())
                .ok_or(SessionError::UnknownItem { id })
        })
        .await
    }

    /// Replace an item's text.
    pub async fn edit_item_text(
        &self,
        id: ItemId,
        text: impl Into<String>,
    ) -> Result<(), SessionError> {
        let text = text.into();
        self.mutate("edit_item_text", move |document| {
            let item = document
                .get_mut(id)
                .ok_or(SessionError::UnknownItem { id })?;
            item.text = text;
            Ok(())
        })
        .await
    }

    // ------------------------------------------------------------------
    // Reconciliation support (consumed by the synchronization layer)
    // ------------------------------------------------------------------

    /// Reset the state machine directly into a foreign session state.
    ///
    /// Direct state assignment, never transition replay: replaying
    /// `enter_edit` and friends against already-foreign data would corrupt
    /// the snapshots. The incoming controller state itself is installed with
    /// the projection via the store; this call resets the session-local
    /// machine bits so any listener observing the store update sees a
    /// machine consistent with the new data. Freshness never survives
    /// adoption — it is meaningful only to the session that established the
    /// snapshot.
    pub fn reinitialize(&self, incoming: &SessionState) {
        self.inner.committed_fresh.store(false, Ordering::Release);
        tracing::debug!(
            controller = %incoming.controller,
            change_count = incoming.change_count,
            "state machine reinitialized from foreign projection"
        );
    }

    /// Replace the committed-snapshot mirror with a foreign value.
    pub fn set_committed_mirror(&self, document: Option<Document>) {
        *self
            .inner
            .committed
            .write()
            .expect("session lock poisoned") = document;
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn ensure_initialized(&self, operation: &'static str) -> Result<(), SessionError> {
        if self.inner.initialized.load(Ordering::Acquire) {
            Ok(())
        } else {
            tracing::warn!(operation, "rejected: controller not initialized");
            Err(SessionError::NotInitialized { operation })
        }
    }

    fn rejected_transition(
        &self,
        operation: &'static str,
        from: ControllerState,
    ) -> SessionError {
        tracing::warn!(operation, %from, "transition rejected");
        SessionError::IllegalTransition { operation, from }
    }

    /// Apply one mutation to the document and republish the change count.
    async fn mutate<F>(&self, operation: &'static str, f: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut Document) -> Result<(), SessionError>,
    {
        self.ensure_initialized(operation)?;
        let current = self.inner.store.snapshot();
        if !current.session.controller.is_editing() {
            tracing::warn!(operation, "mutation rejected outside an edit session");
            return Err(SessionError::NotEditing { operation });
        }

        let mut document = current.document;
        if let Err(e) = f(&mut document) {
            tracing::warn!(operation, error = %e, "mutation rejected");
            return Err(e);
        }

        let change_count = self.recompute_count(&document);
        self.inner
            .store
            .apply(move |state| StoreState {
                document,
                session: SessionState {
                    change_count,
                    ..state.session.clone()
                },
            })
            .await?;
        Ok(())
    }

    /// The uncommitted count of `document` against the committed snapshot.
    fn recompute_count(&self, document: &Document) -> usize {
        match &*self
            .inner
            .committed
            .read()
            .expect("session lock poisoned")
        {
            Some(committed) => changed_count(document, committed),
            None => 0,
        }
    }

    async fn persist_committed(&self, document: &Document) -> Result<(), SessionError> {
        let bytes = encode_document(document)?;
        self.inner
            .store
            .storage()
            .set(&self.inner.store.config().committed_key(), bytes)
            .await
            .map_err(redline_store::StoreError::from)?;
        Ok(())
    }
}
