use crate::domain::ports::KeyValueStore;
use crate::utils::error::{Result, TaxError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

impl StoredEntry {
    fn new(value: &str, ttl: Option<Duration>) -> Self {
        Self {
            value: value.to_string(),
            expires_at: ttl.map(|ttl| Utc::now() + ttl),
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, StoredEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = lock(&self.entries);
        match entries.get(key) {
            Some(entry) if entry.is_expired(Utc::now()) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        lock(&self.entries).insert(key.to_string(), StoredEntry::new(value, ttl));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

/// JSON file under the state directory; every operation reads and rewrites it.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    io_lock: Mutex<()>,
}

impl FileStore {
    pub const FILE_NAME: &'static str = "state.json";

    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(Self::FILE_NAME),
            io_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, StoredEntry>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let data = fs::read(&self.path)?;
        if data.is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_slice(&data).map_err(|e| TaxError::StorageError {
            message: format!("Corrupt state file {}: {}", self.path.display(), e),
        })
    }

    fn save(&self, entries: &HashMap<String, StoredEntry>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(entries)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = lock(&self.io_lock);
        let mut entries = self.load()?;
        match entries.get(key) {
            Some(entry) if entry.is_expired(Utc::now()) => {
                tracing::debug!("Dropping expired entry '{}' from {}", key, self.path.display());
                entries.remove(key);
                self.save(&entries)?;
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let _guard = lock(&self.io_lock);
        let mut entries = self.load()?;
        entries.insert(key.to_string(), StoredEntry::new(value, ttl));
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = lock(&self.io_lock);
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("accessToken").unwrap(), None);

        store.set("accessToken", "abc", None).unwrap();
        assert_eq!(store.get("accessToken").unwrap().as_deref(), Some("abc"));

        store.remove("accessToken").unwrap();
        assert_eq!(store.get("accessToken").unwrap(), None);
    }

    #[test]
    fn test_memory_store_expired_entry_reads_as_absent() {
        let store = MemoryStore::new();
        store
            .set("lastSelectedCountry", "US", Some(Duration::seconds(-1)))
            .unwrap();
        assert_eq!(store.get("lastSelectedCountry").unwrap(), None);

        store
            .set("lastSelectedCountry", "CA", Some(Duration::days(30)))
            .unwrap();
        assert_eq!(store.get("lastSelectedCountry").unwrap().as_deref(), Some("CA"));
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();

        let store = FileStore::new(temp_dir.path());
        store.set("accessToken", "persisted", None).unwrap();
        store
            .set("lastSelectedCountry", "DE", Some(Duration::days(30)))
            .unwrap();

        let reopened = FileStore::new(temp_dir.path());
        assert_eq!(reopened.get("accessToken").unwrap().as_deref(), Some("persisted"));
        assert_eq!(reopened.get("lastSelectedCountry").unwrap().as_deref(), Some("DE"));

        reopened.remove("accessToken").unwrap();
        assert_eq!(store.get("accessToken").unwrap(), None);
    }

    #[test]
    fn test_file_store_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested").join("state");

        let store = FileStore::new(&nested);
        store.set("k", "v", None).unwrap();

        assert!(nested.join(FileStore::FILE_NAME).exists());
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(FileStore::FILE_NAME), b"not json").unwrap();

        let store = FileStore::new(temp_dir.path());
        let err = store.get("accessToken").unwrap_err();
        assert!(matches!(err, TaxError::StorageError { .. }));
    }
}
