//! Key-value string storage consumed by the persisted collections.
//!
//! The store only ever sees opaque strings; encoding is the collections'
//! business. Every handle is cheap to clone and shares its backing data, so a
//! single store can be injected into several collections at once.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, error, trace, warn};

/// Store handle shared by everything persisted in one process.
pub type SharedStore = Arc<dyn KeyValueStore>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("writing '{key}' needs {needed} bytes but the store quota is {quota}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Encoding(#[from] serde_json::Error),
}

pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`. `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

fn footprint<'a>(entries: impl Iterator<Item = (&'a String, &'a String)>) -> usize {
    entries.map(|(k, v)| k.len() + v.len()).sum()
}

fn check_quota(
    key: &str,
    value: &str,
    current: Option<&String>,
    used: usize,
    quota: Option<usize>,
) -> Result<(), StoreError> {
    let Some(quota) = quota else {
        return Ok(());
    };

    let released = current.map(|v| key.len() + v.len()).unwrap_or(0);
    let needed = used - released + key.len() + value.len();
    if needed > quota {
        return Err(StoreError::QuotaExceeded {
            key: key.to_string(),
            needed,
            quota,
        });
    }
    Ok(())
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects writes once keys plus values exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Arc::default(),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().map(|e| e.contains_key(key)).unwrap_or(false)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .lock()
            .map(|e| e.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.lock()?;
        let used = footprint(entries.iter());
        check_quota(key, value, entries.get(key), used, self.quota_bytes)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Store persisted as a single JSON object file mapping keys to values.
///
/// The file is read on first access and rewritten in full on every change.
/// A change only becomes visible in memory once the file write succeeded.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    quota_bytes: Option<usize>,
    cache: Arc<Mutex<Option<BTreeMap<String, String>>>>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            quota_bytes: None,
            cache: Arc::default(),
        }
    }

    pub fn with_quota(mut self, quota_bytes: Option<usize>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(
                    target: "storage",
                    "{:?} is not a valid store file, starting empty: {}", self.path, e
                );
                self.backup_unreadable(&content);
                Ok(BTreeMap::new())
            }
        }
    }

    /// Where the last unreadable file is kept before it gets overwritten.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".bak");
        self.path.with_file_name(name)
    }

    fn backup_unreadable(&self, content: &str) {
        let backup = self.backup_path();
        if let Err(e) = fs::write(&backup, content) {
            error!(target: "storage", "Failed to back up unreadable store file: {}", e);
        } else {
            debug!(target: "storage", "Backed up unreadable store file to {:?}", backup);
        }
    }

    fn write_file(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content)?;
        trace!(target: "storage", "Rewrote {:?} ({} keys)", self.path, entries.len());
        Ok(())
    }

    /// Run `f` against the loaded map, loading it from disk first if needed.
    fn with_entries<T>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| StoreError::Unavailable("file store lock poisoned".to_string()))?;

        if cache.is_none() {
            let entries = self.read_file()?;
            debug!(target: "storage", "Loaded {} keys from {:?}", entries.len(), self.path);
            *cache = Some(entries);
        }

        match cache.as_mut() {
            Some(entries) => f(entries),
            None => Err(StoreError::Unavailable("file store not loaded".to_string())),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.with_entries(|entries| Ok(entries.get(key).cloned()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.with_entries(|entries| {
            let used = footprint(entries.iter());
            check_quota(key, value, entries.get(key), used, self.quota_bytes)?;

            let mut updated = entries.clone();
            updated.insert(key.to_string(), value.to_string());
            self.write_file(&updated)?;
            *entries = updated;
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.with_entries(|entries| {
            if !entries.contains_key(key) {
                return Ok(());
            }

            let mut updated = entries.clone();
            updated.remove(key);
            self.write_file(&updated)?;
            *entries = updated;
            Ok(())
        })
    }
}
