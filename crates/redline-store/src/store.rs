//! The document store
//!
//! A cheaply clonable handle over the authoritative in-memory state of one
//! instance. Writes are total functions over the full state; under the
//! intended single-threaded cooperative scheduling they are race-free without
//! any coordination beyond the internal lock.

// Lock poisoning from panics is unrecoverable here, so expect() is the
// appropriate handling pattern.
#![allow(clippy::expect_used)]

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::projection::{decode_document, PersistedProjection};
use redline_core::effects::{SourceEffects, StorageEffects};
use redline_core::{Document, SessionState};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// The full state held by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreState {
    /// The working document.
    pub document: Document,
    /// Controller state, working baseline, and published change count.
    pub session: SessionState,
}

impl StoreState {
    /// A state wrapping `document` with a fresh viewing session.
    pub fn viewing(document: Document) -> Self {
        Self {
            document,
            session: SessionState::viewing(),
        }
    }
}

/// Identifier of a registered watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

type WatchFn = Box<dyn Fn(&StoreState) + Send + Sync>;

struct StoreInner {
    state: RwLock<StoreState>,
    version: AtomicU64,
    watchers: RwLock<Vec<(WatchId, WatchFn)>>,
    next_watch_id: AtomicU64,
    syncing: AtomicBool,
    storage: Arc<dyn StorageEffects>,
    config: StoreConfig,
}

/// The authoritative in-memory document and session state for one instance.
///
/// Clones share state. Watcher callbacks run synchronously on the writing
/// call stack, in registration order; they must not register or remove
/// watchers reentrantly.
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<StoreInner>,
}

impl DocumentStore {
    /// Create a store over `initial`, persisting through `storage`.
    ///
    /// No IO happens here; the first durability write occurs on the first
    /// [`apply`](Self::apply).
    pub fn new(storage: Arc<dyn StorageEffects>, config: StoreConfig, initial: StoreState) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(initial),
                version: AtomicU64::new(0),
                watchers: RwLock::new(Vec::new()),
                next_watch_id: AtomicU64::new(0),
                syncing: AtomicBool::new(false),
                storage,
                config,
            }),
        }
    }

    /// Atomic read: a clone of the full current state.
    pub fn snapshot(&self) -> StoreState {
        self.inner
            .state
            .read()
            .expect("store lock poisoned")
            .clone()
    }

    /// The version counter, incremented on every installed write.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    /// The key configuration this store persists under.
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// The storage handle this store persists through.
    pub fn storage(&self) -> &Arc<dyn StorageEffects> {
        &self.inner.storage
    }

    /// Atomic write: install `updater(current)` as the new state.
    ///
    /// After installation the watchers are notified synchronously, then the
    /// projection is persisted to durable storage — unless the
    /// loop-prevention flag is set, in which case the durability hook is
    /// skipped (the write was sourced from the synchronization layer and is
    /// already durable elsewhere).
    pub async fn apply<F>(&self, updater: F) -> Result<StoreState, StoreError>
    where
        F: FnOnce(&StoreState) -> StoreState,
    {
        let next = {
            let mut guard = self.inner.state.write().expect("store lock poisoned");
            let next = updater(&guard);
            *guard = next.clone();
            next
        };
        self.inner.version.fetch_add(1, Ordering::Release);
        self.notify(&next);

        if self.is_syncing() {
            tracing::debug!("skipping durability write for sync-sourced state");
        } else {
            self.persist(&next).await?;
        }
        Ok(next)
    }

    /// Wholesale overwrite used by the synchronization layer.
    ///
    /// Installs `state`, notifies watchers synchronously, and never persists:
    /// the caller is adopting a projection that is already durable.
    pub fn adopt(&self, state: StoreState) {
        {
            let mut guard = self.inner.state.write().expect("store lock poisoned");
            *guard = state.clone();
        }
        self.inner.version.fetch_add(1, Ordering::Release);
        self.notify(&state);
    }

    /// Register a synchronous watcher, invoked after every installed write.
    pub fn watch<F>(&self, callback: F) -> WatchId
    where
        F: Fn(&StoreState) + Send + Sync + 'static,
    {
        let id = WatchId(self.inner.next_watch_id.fetch_add(1, Ordering::Relaxed));
        self.inner
            .watchers
            .write()
            .expect("store lock poisoned")
            .push((id, Box::new(callback)));
        id
    }

    /// Remove a watcher. Returns whether it was registered.
    pub fn unwatch(&self, id: WatchId) -> bool {
        let mut watchers = self.inner.watchers.write().expect("store lock poisoned");
        let before = watchers.len();
        watchers.retain(|(watch_id, _)| *watch_id != id);
        watchers.len() != before
    }

    /// Raise the loop-prevention flag: subsequent writes skip durability.
    pub fn begin_sync(&self) {
        self.inner.syncing.store(true, Ordering::Release);
    }

    /// Clear the loop-prevention flag.
    pub fn end_sync(&self) {
        self.inner.syncing.store(false, Ordering::Release);
    }

    /// Whether the loop-prevention flag is currently raised.
    pub fn is_syncing(&self) -> bool {
        self.inner.syncing.load(Ordering::Acquire)
    }

    fn notify(&self, state: &StoreState) {
        let watchers = self.inner.watchers.read().expect("store lock poisoned");
        for (_, callback) in watchers.iter() {
            callback(state);
        }
    }

    async fn persist(&self, state: &StoreState) -> Result<(), StoreError> {
        let projection = PersistedProjection {
            document: state.document.clone(),
            session: state.session.clone(),
        };
        let bytes = projection.encode()?;
        self.inner
            .storage
            .set(&self.inner.config.projection_key(), bytes)
            .await?;
        tracing::debug!(
            key = %self.inner.config.projection_key(),
            items = state.document.len(),
            "persisted projection"
        );
        Ok(())
    }
}

/// One-time startup read: the persisted projection and committed snapshot.
///
/// Absent storage seeds the document from the bulk-load collaborator with a
/// fresh viewing session. Corrupt bytes under either key are logged and
/// treated exactly like absence; they are overwritten by the next successful
/// write. Returns the initial state and the committed snapshot, if any.
pub async fn load_or_seed(
    storage: &Arc<dyn StorageEffects>,
    config: &StoreConfig,
    source: &Arc<dyn SourceEffects>,
) -> Result<(StoreState, Option<Document>), StoreError> {
    let state = match storage.get(&config.projection_key()).await? {
        Some(bytes) => match PersistedProjection::decode(&bytes) {
            Ok(projection) => StoreState {
                document: projection.document,
                session: projection.session,
            },
            Err(e) => {
                tracing::warn!(
                    key = %config.projection_key(),
                    error = %e,
                    "persisted projection is corrupt, falling back to initial load"
                );
                StoreState::viewing(source.load_initial_document().await?)
            }
        },
        None => StoreState::viewing(source.load_initial_document().await?),
    };

    let committed = match storage.get(&config.committed_key()).await? {
        Some(bytes) => match decode_document(&bytes) {
            Ok(document) => Some(document),
            Err(e) => {
                tracing::warn!(
                    key = %config.committed_key(),
                    error = %e,
                    "committed snapshot is corrupt, ignoring"
                );
                None
            }
        },
        None => None,
    };

    Ok((state, committed))
}
