//! In-process storage notification bus
//!
//! The Rust analog of the browser storage-event channel: all storage handlers
//! attached to one substrate share a bus, and every successful `set`/`remove`
//! is delivered to every subscriber except the originating instance, in write
//! order.

// Lock poisoning from panics is unrecoverable here, so expect() is the
// appropriate handling pattern.
#![allow(clippy::expect_used)]

use futures::channel::mpsc;
use futures::StreamExt;
use redline_core::effects::{InstanceId, StorageEvent, StorageEventStream};
use std::sync::{Arc, Mutex};

struct Subscriber {
    instance: InstanceId,
    sender: mpsc::UnboundedSender<StorageEvent>,
}

/// Shared notification channel for one storage substrate.
///
/// Cheaply clonable; all clones address the same subscriber set.
#[derive(Clone, Default)]
pub struct StorageBus {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

impl StorageBus {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscription for `instance`.
    ///
    /// The returned stream yields every event published by *other* instances
    /// from this point on. Dropping the stream unsubscribes lazily on the
    /// next publish.
    pub fn subscribe(&self, instance: InstanceId) -> StorageEventStream {
        let (sender, receiver) = mpsc::unbounded();
        self.subscribers
            .lock()
            .expect("storage bus lock poisoned")
            .push(Subscriber { instance, sender });
        receiver.boxed()
    }

    /// Publish an event to every subscriber except the origin.
    ///
    /// Delivery is synchronous with the publishing write: events land in
    /// subscriber queues before this call returns, so cross-instance ordering
    /// matches write ordering.
    pub fn publish(&self, event: StorageEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .expect("storage bus lock poisoned");
        subscribers.retain(|sub| {
            if sub.instance == event.origin {
                return true;
            }
            sub.sender.unbounded_send(event.clone()).is_ok()
        });
    }

    /// Number of live subscriptions (for diagnostics).
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .expect("storage bus lock poisoned")
            .len()
    }
}
