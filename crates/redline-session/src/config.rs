//! Controller configuration

/// Per-instance controller configuration.
///
/// `remote_capability` is resolved once, by the embedder, at construction
/// time and read-only thereafter — whether this instance can reach the remote
/// persistence service. It is never persisted: instances sharing a substrate
/// may differ in capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Whether `commit` may push to the remote persistence service.
    pub remote_capability: bool,
}

impl SessionConfig {
    /// Config with the given capability.
    pub fn new(remote_capability: bool) -> Self {
        Self { remote_capability }
    }

    /// An instance that can reach the remote persistence service.
    pub fn with_remote() -> Self {
        Self::new(true)
    }

    /// An instance limited to local durability (`save_local` only).
    pub fn local_only() -> Self {
        Self::new(false)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::local_only()
    }
}
