//! Backend standing in for disabled or inaccessible storage

use super::StorageBackend;
use crate::error::{Error, Result};

/// Fails every operation
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableBackend;

fn unavailable(key: &str) -> Error {
    Error::Storage {
        key: key.to_string(),
        reason: "storage is unavailable".to_string(),
    }
}

impl StorageBackend for UnavailableBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Err(unavailable(key))
    }

    fn write(&self, key: &str, _value: &str) -> Result<()> {
        Err(unavailable(key))
    }

    fn delete(&self, key: &str) -> Result<()> {
        Err(unavailable(key))
    }
}
