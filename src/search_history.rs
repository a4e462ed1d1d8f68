use crate::clock::{Clock, IdGenerator, SystemClock};
use crate::persisted::{load_list, remove_key, write_list};
use crate::store::SharedStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Store key holding the serialized search history.
pub const SEARCH_HISTORY_KEY: &str = "searchHistory";

/// History length used when nothing else is configured.
pub const DEFAULT_MAX_HISTORY_ITEMS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub id: String,
    pub keyword: String,
    pub location: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl SearchQuery {
    /// Exact, case-sensitive comparison of the search terms.
    pub fn same_terms(&self, keyword: &str, location: &str) -> bool {
        self.keyword == keyword && self.location == location
    }
}

/// Recent searches, newest first, without duplicate keyword/location pairs
/// and never longer than `max_items`.
pub struct SearchHistoryCollection {
    entries: Vec<SearchQuery>,
    max_items: usize,
    store: SharedStore,
    clock: Arc<dyn Clock>,
    ids: IdGenerator,
}

impl SearchHistoryCollection {
    pub fn new(store: SharedStore) -> Self {
        Self::with_max_items(store, Arc::new(SystemClock), DEFAULT_MAX_HISTORY_ITEMS)
    }

    /// `max_items` below one is treated as one.
    pub fn with_max_items(store: SharedStore, clock: Arc<dyn Clock>, max_items: usize) -> Self {
        let mut history = Self {
            entries: Vec::new(),
            max_items: max_items.max(1),
            store,
            clock,
            ids: IdGenerator::new(),
        };
        history.reload();
        history
    }

    /// Record a search the user just ran and move it to the front.
    ///
    /// Keyword and location are stored as given; trimming is the caller's job.
    /// Entries pushed past the end by this call are gone for good.
    pub fn record(&mut self, keyword: &str, location: &str) -> SearchQuery {
        let timestamp = self.clock.now_millis();
        let query = SearchQuery {
            id: self.ids.next_id(timestamp),
            keyword: keyword.to_string(),
            location: location.to_string(),
            timestamp,
        };

        self.entries.retain(|entry| !entry.same_terms(keyword, location));
        self.entries.insert(0, query.clone());
        if self.entries.len() > self.max_items {
            let dropped = self.entries.len() - self.max_items;
            self.entries.truncate(self.max_items);
            debug!(target: "storage", "Dropped {} old search(es) past the limit of {}", dropped, self.max_items);
        }

        self.persist();
        query
    }

    pub fn entries(&self) -> &[SearchQuery] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&SearchQuery> {
        self.entries.first()
    }

    pub fn get(&self, index: usize) -> Option<&SearchQuery> {
        self.entries.get(index)
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop everything and remove the store entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        if remove_key(self.store.as_ref(), SEARCH_HISTORY_KEY) {
            info!(target: "storage", "Cleared search history");
        }
    }

    /// Replace the in-memory history with what the store currently holds.
    ///
    /// Stored history longer than the limit is cut down in memory only; the
    /// store catches up on the next write.
    pub fn reload(&mut self) {
        let mut entries: Vec<SearchQuery> = load_list(self.store.as_ref(), SEARCH_HISTORY_KEY);
        entries.truncate(self.max_items);
        for entry in &entries {
            self.ids.observe(&entry.id);
        }
        self.entries = entries;
    }

    fn persist(&self) {
        write_list(self.store.as_ref(), SEARCH_HISTORY_KEY, &self.entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::{KeyValueStore, MemoryStore};

    fn history(store: &MemoryStore, clock: &ManualClock, max: usize) -> SearchHistoryCollection {
        SearchHistoryCollection::with_max_items(Arc::new(store.clone()), Arc::new(clock.clone()), max)
    }

    fn terms(history: &SearchHistoryCollection) -> Vec<(&str, &str)> {
        history
            .entries()
            .iter()
            .map(|e| (e.keyword.as_str(), e.location.as_str()))
            .collect()
    }

    #[test]
    fn test_repeat_search_moves_to_front() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(1_000);
        let mut history = history(&store, &clock, 5);

        history.record("go", "remote");
        clock.advance(10);
        history.record("rust", "");
        clock.advance(10);
        history.record("go", "remote");

        assert_eq!(terms(&history), vec![("go", "remote"), ("rust", "")]);
        assert_eq!(history.latest().unwrap().timestamp, 1_020);
    }

    #[test]
    fn test_duplicate_check_is_case_sensitive() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(1_000);
        let mut history = history(&store, &clock, 5);

        history.record("React", "Berlin");
        clock.advance(1);
        history.record("react", "Berlin");
        clock.advance(1);
        history.record("React", "berlin");

        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_bounded_to_max_items() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(1_000);
        let mut history = history(&store, &clock, 5);

        for i in 0..6 {
            history.record(&format!("keyword{}", i), "");
            clock.advance(1);
        }

        let keywords: Vec<&str> = history.entries().iter().map(|e| e.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["keyword5", "keyword4", "keyword3", "keyword2", "keyword1"]);

        let stored: Vec<SearchQuery> =
            serde_json::from_str(&store.get(SEARCH_HISTORY_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored, history.entries());
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(1_000);
        let mut history = history(&store, &clock, 5);

        let first = history.record("a", "");
        let second = history.record("b", "");

        assert_ne!(first.id, second.id);
        assert_eq!(first.timestamp, second.timestamp);
    }

    #[test]
    fn test_zero_max_is_clamped() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(1_000);
        let mut history = history(&store, &clock, 0);

        history.record("a", "");
        history.record("b", "");
        assert_eq!(history.max_items(), 1);
        assert_eq!(terms(&history), vec![("b", "")]);
    }

    #[test]
    fn test_wire_format() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(1_700_000_000_000);
        let mut history = history(&store, &clock, 5);
        history.record("rust", "Berlin");

        assert_eq!(
            store.get(SEARCH_HISTORY_KEY).unwrap().unwrap(),
            r#"[{"id":"1700000000000","keyword":"rust","location":"Berlin","timestamp":1700000000000}]"#
        );
    }

    #[test]
    fn test_oversized_stored_history_is_trimmed_on_load() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(1_000);
        {
            let mut wide = history(&store, &clock, 10);
            for i in 0..8 {
                wide.record(&format!("k{}", i), "");
                clock.advance(1);
            }
        }

        let narrow = history(&store, &clock, 3);
        assert_eq!(narrow.len(), 3);
        assert_eq!(narrow.latest().unwrap().keyword, "k7");
    }
}
