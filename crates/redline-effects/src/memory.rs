//! In-memory storage handler
//!
//! The default substrate for tests and short-lived embedders. All handlers
//! attached to one [`MemorySubstrate`] share the same map and bus, modelling
//! several instances ("tabs") over one durable store.

use crate::bus::StorageBus;
use async_trait::async_trait;
use redline_core::effects::{
    InstanceId, StorageEffects, StorageError, StorageEvent, StorageEventStream,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared backing state for any number of attached memory handlers.
#[derive(Clone, Default)]
pub struct MemorySubstrate {
    data: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    bus: StorageBus,
}

impl MemorySubstrate {
    /// Create an empty substrate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new instance to this substrate.
    pub fn attach(&self) -> MemoryStorageHandler {
        MemoryStorageHandler {
            substrate: self.clone(),
            instance: InstanceId::new(),
            writes: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The notification bus shared by all attached instances.
    pub fn bus(&self) -> &StorageBus {
        &self.bus
    }
}

/// One instance's handle onto a [`MemorySubstrate`].
#[derive(Clone)]
pub struct MemoryStorageHandler {
    substrate: MemorySubstrate,
    instance: InstanceId,
    writes: Arc<AtomicU64>,
}

impl MemoryStorageHandler {
    /// A handler on a private, single-instance substrate.
    pub fn standalone() -> Self {
        MemorySubstrate::new().attach()
    }

    /// Total `set`/`remove` calls performed through this handle.
    ///
    /// Lets tests assert that a code path performed no durability writes.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Acquire)
    }
}

#[async_trait]
impl StorageEffects for MemoryStorageHandler {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let data = self.substrate.data.read().await;
        Ok(data.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey {
                reason: "key cannot be empty".to_string(),
            });
        }

        {
            let mut data = self.substrate.data.write().await;
            data.insert(key.to_string(), value.clone());
        }
        self.writes.fetch_add(1, Ordering::Release);

        self.substrate.bus.publish(StorageEvent {
            key: key.to_string(),
            value: Some(value),
            origin: self.instance,
        });
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let removed = {
            let mut data = self.substrate.data.write().await;
            data.remove(key).is_some()
        };
        self.writes.fetch_add(1, Ordering::Release);

        if removed {
            self.substrate.bus.publish(StorageEvent {
                key: key.to_string(),
                value: None,
                origin: self.instance,
            });
        }
        Ok(())
    }

    fn subscribe(&self) -> StorageEventStream {
        self.substrate.bus.subscribe(self.instance)
    }

    fn instance_id(&self) -> InstanceId {
        self.instance
    }
}
