//! Durable storage effect interface
//!
//! A string-keyed byte store with a change-notification channel. Two keys are
//! in use by the system: the persisted projection (document + session state)
//! and the committed snapshot. The notification channel is the substrate the
//! synchronization layer rides on: every successful `set`/`remove` in one
//! instance is delivered as a [`StorageEvent`] to all *other* instances
//! attached to the same substrate, in write order.

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Identity of one attached instance (one "tab" over the shared substrate).
///
/// Used to suppress delivery of an instance's own writes back to itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(Uuid);

impl InstanceId {
    /// Generate a fresh instance id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A write observed on the shared substrate.
#[derive(Debug, Clone)]
pub struct StorageEvent {
    /// The key that was written or removed.
    pub key: String,
    /// The new bytes, or `None` when the key was removed.
    pub value: Option<Vec<u8>>,
    /// The instance that performed the write.
    pub origin: InstanceId,
}

/// Stream of storage events originated by other instances.
pub type StorageEventStream = BoxStream<'static, StorageEvent>;

/// Errors surfaced by storage handlers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The key is not acceptable to the backend.
    #[error("invalid storage key: {reason}")]
    InvalidKey {
        /// Why the key was rejected.
        reason: String,
    },
    /// The backend failed to read or write.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Pure trait for the durable storage collaborator.
#[async_trait]
pub trait StorageEffects: Send + Sync {
    /// Read the bytes stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Subscribe to writes performed by *other* instances on this substrate.
    ///
    /// Events are delivered in the order the writes occurred. The stream ends
    /// when the substrate is dropped.
    fn subscribe(&self) -> StorageEventStream;

    /// The identity of this attached instance.
    fn instance_id(&self) -> InstanceId;
}
