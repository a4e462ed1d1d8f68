//! Soft-failing load/write helpers shared by the persisted collections.
//!
//! Nothing here returns an error: problems are logged under the `storage`
//! target and the caller keeps going with whatever it has in memory.

use crate::store::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

/// Load the list stored under `key`.
///
/// Absent keys, empty strings and malformed content all yield an empty list.
pub fn load_list<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Vec<T> {
    let content = match store.get(key) {
        Ok(Some(content)) => content,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(target: "storage", "Error loading '{}': {}", key, e);
            return Vec::new();
        }
    };

    if content.trim().is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Vec<T>>(&content) {
        Ok(items) => {
            debug!(target: "storage", "Loaded {} entries from '{}'", items.len(), key);
            items
        }
        Err(e) => {
            warn!(target: "storage", "Error loading '{}', starting empty: {}", key, e);
            Vec::new()
        }
    }
}

/// Rewrite the whole list under `key`. Returns whether the write landed.
pub fn write_list<T: Serialize>(store: &dyn KeyValueStore, key: &str, items: &[T]) -> bool {
    let content = match serde_json::to_string(items) {
        Ok(content) => content,
        Err(e) => {
            error!(target: "storage", "Error encoding '{}': {}", key, e);
            return false;
        }
    };

    match store.set(key, &content) {
        Ok(()) => {
            debug!(target: "storage", "Saved {} entries to '{}'", items.len(), key);
            true
        }
        Err(e) => {
            error!(target: "storage", "Error saving '{}': {}", key, e);
            false
        }
    }
}

pub fn remove_key(store: &dyn KeyValueStore, key: &str) -> bool {
    match store.remove(key) {
        Ok(()) => true,
        Err(e) => {
            error!(target: "storage", "Error removing '{}': {}", key, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_absent_and_empty_load_as_empty() {
        let store = MemoryStore::new();
        assert!(load_list::<String>(&store, "missing").is_empty());

        store.set("blank", "").unwrap();
        assert!(load_list::<String>(&store, "blank").is_empty());

        store.set("empty", "[]").unwrap();
        assert!(load_list::<String>(&store, "empty").is_empty());
    }

    #[test]
    fn test_non_array_content_loads_as_empty() {
        let store = MemoryStore::new();
        for bad in ["\"just a string\"", "{\"id\":\"1\"}", "[1, 2", "42", "null"] {
            store.set("k", bad).unwrap();
            assert!(load_list::<String>(&store, "k").is_empty(), "content: {}", bad);
        }
    }

    #[test]
    fn test_write_reports_quota_failure() {
        let store = MemoryStore::with_quota(8);
        let items = vec!["a very long entry".to_string()];
        assert!(!write_list(&store, "k", &items));
        assert!(!store.contains_key("k"));
    }
}
