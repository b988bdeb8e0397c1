//! Key-value storage capability
//!
//! Backends are fallible; [`Storage`] wraps one and makes every operation
//! non-throwing. A failed read behaves like a missing key and a failed
//! write or removal is dropped, each with a warning. Two handles are
//! usually wired up: a session-scoped one and a long-lived one.

mod json_file;
mod memory;
mod unavailable;

use std::sync::Arc;

use tracing::warn;

use crate::error::Result;

pub use json_file::JsonFileBackend;
pub use memory::MemoryBackend;
pub use unavailable::UnavailableBackend;

/// Fallible string key-value backend
pub trait StorageBackend: Send + Sync {
    /// Value stored under `key`, `None` when absent
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing an absent key is not an error
    fn delete(&self, key: &str) -> Result<()>;
}

/// Non-throwing handle over a storage backend
///
/// Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn StorageBackend>,
}

impl Storage {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Fresh in-memory storage
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Storage whose every operation fails (disabled storage)
    pub fn unavailable() -> Self {
        Self::new(UnavailableBackend)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match self.backend.read(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Storage read of '{}' failed: {}", key, e);
                None
            }
        }
    }

    pub fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.backend.write(key, value) {
            warn!("Storage write of '{}' failed: {}", key, e);
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.backend.delete(key) {
            warn!("Storage removal of '{}' failed: {}", key, e);
        }
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_round_trip_in_memory() {
        let storage = Storage::in_memory();
        assert_eq!(storage.get("k"), None);
        storage.set("k", "v");
        assert_eq!(storage.get("k").as_deref(), Some("v"));
        storage.remove("k");
        assert_eq!(storage.get("k"), None);
    }

    #[test]
    fn test_unavailable_storage_never_panics() {
        let storage = Storage::unavailable();
        storage.set("k", "v");
        storage.remove("k");
        assert_eq!(storage.get("k"), None);
    }

    #[test]
    fn test_clones_share_backend() {
        let storage = Storage::in_memory();
        let other = storage.clone();
        storage.set("k", "1");
        assert_eq!(other.get("k").as_deref(), Some("1"));
    }
}
