//! JSON file storage backend
//!
//! The whole store is one JSON object of string values. Writes go to a
//! sibling `.tmp` file that is then renamed over the target, so a crash
//! mid-write leaves the previous contents intact.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use super::StorageBackend;
use crate::error::Result;

type Values = BTreeMap<String, String>;

/// Key-value store persisted to a single JSON file
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    // Serialises read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current contents; a missing file is an empty store
    fn load(&self) -> Result<Values> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Values::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Contents to modify; a corrupt file is discarded rather than kept
    fn load_for_update(&self) -> Result<Values> {
        match self.load() {
            Ok(values) => Ok(values),
            Err(crate::Error::Json(e)) => {
                warn!("Discarding corrupt store {}: {}", self.path.display(), e);
                Ok(Values::new())
            }
            Err(e) => Err(e),
        }
    }

    fn save(&self, values: &Values) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, serde_json::to_string_pretty(values)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Saved store {}", self.path.display());
        Ok(())
    }
}

impl StorageBackend for JsonFileBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.guard();
        Ok(self.load()?.remove(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.guard();
        let mut values = self.load_for_update()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let _guard = self.guard();
        let mut values = self.load_for_update()?;
        if values.remove(key).is_some() {
            self.save(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("state.json"));
        assert_eq!(backend.read("k").unwrap(), None);
    }

    #[test]
    fn test_write_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/state.json");

        JsonFileBackend::new(&path).write("k", "v").unwrap();
        let reopened = JsonFileBackend::new(&path);

        assert_eq!(reopened.read("k").unwrap().as_deref(), Some("v"));
        assert!(!dir.path().join("nested/state.json.tmp").exists());
    }

    #[test]
    fn test_delete_removes_only_that_key() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("state.json"));
        backend.write("a", "1").unwrap();
        backend.write("b", "2").unwrap();

        backend.delete("a").unwrap();
        backend.delete("missing").unwrap();

        assert_eq!(backend.read("a").unwrap(), None);
        assert_eq!(backend.read("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_corrupt_file_read_errors_and_write_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();
        let backend = JsonFileBackend::new(&path);

        assert!(backend.read("k").is_err());
        backend.write("k", "v").unwrap();
        assert_eq!(backend.read("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_non_string_values_are_a_read_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"k": 5}"#).unwrap();

        assert!(JsonFileBackend::new(&path).read("k").is_err());
    }
}
