//! Filesystem-backed storage handler
//!
//! Stores each key as a file (`<key>.dat`) under a base directory; keys may
//! contain path separators. Cross-instance notification still goes through an
//! in-process [`StorageBus`]: instances in other processes are outside this
//! handler's scope.

use crate::bus::StorageBus;
use async_trait::async_trait;
use redline_core::effects::{
    InstanceId, StorageEffects, StorageError, StorageEvent, StorageEventStream,
};
use std::path::PathBuf;
use tokio::fs;

/// Filesystem-based storage handler.
#[derive(Clone)]
pub struct FilesystemStorageHandler {
    base_path: PathBuf,
    bus: StorageBus,
    instance: InstanceId,
}

impl FilesystemStorageHandler {
    /// Create a handler rooted at `base_path`, attached to `bus`.
    pub fn new(base_path: PathBuf, bus: StorageBus) -> Self {
        Self {
            base_path,
            bus,
            instance: InstanceId::new(),
        }
    }

    /// Create a handler with a private bus (single-instance use).
    pub fn standalone(base_path: PathBuf) -> Self {
        Self::new(base_path, StorageBus::new())
    }

    fn file_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey {
                reason: "key cannot be empty".to_string(),
            });
        }
        if key.split('/').any(|part| part == "..") {
            return Err(StorageError::InvalidKey {
                reason: "key must not traverse outside the base directory".to_string(),
            });
        }
        Ok(self.base_path.join(format!("{key}.dat")))
    }
}

#[async_trait]
impl StorageEffects for FilesystemStorageHandler {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let file_path = self.file_path(key)?;
        match fs::read(&file_path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Backend(format!(
                "failed to read {}: {e}",
                file_path.display()
            ))),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        let file_path = self.file_path(key)?;
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::Backend(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        fs::write(&file_path, &value).await.map_err(|e| {
            StorageError::Backend(format!("failed to write {}: {e}", file_path.display()))
        })?;

        self.bus.publish(StorageEvent {
            key: key.to_string(),
            value: Some(value),
            origin: self.instance,
        });
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let file_path = self.file_path(key)?;
        match fs::remove_file(&file_path).await {
            Ok(()) => {
                self.bus.publish(StorageEvent {
                    key: key.to_string(),
                    value: None,
                    origin: self.instance,
                });
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Backend(format!(
                "failed to remove {}: {e}",
                file_path.display()
            ))),
        }
    }

    fn subscribe(&self) -> StorageEventStream {
        self.bus.subscribe(self.instance)
    }

    fn instance_id(&self) -> InstanceId {
        self.instance
    }
}
