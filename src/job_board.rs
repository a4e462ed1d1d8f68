//! Ties the store, both collections and the search endpoint together the way
//! the app's screens use them.

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::job::JobRecord;
use crate::mock_search::{MockJobSearch, SearchError, SearchRequest};
use crate::persisted::{load_list, remove_key, write_list};
use crate::saved_jobs::SavedJobCollection;
use crate::search_history::{SearchHistoryCollection, SearchQuery};
use crate::store::SharedStore;
use std::sync::Arc;
use tracing::info;

/// Store key remembering the listings from the most recent search.
pub const LAST_RESULTS_KEY: &str = "lastSearchResults";

pub struct JobBoard {
    store: SharedStore,
    saved: SavedJobCollection,
    history: SearchHistoryCollection,
    search: MockJobSearch,
    last_results: Vec<JobRecord>,
}

impl JobBoard {
    pub fn new(store: SharedStore, config: &Config) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    pub fn with_clock(store: SharedStore, config: &Config, clock: Arc<dyn Clock>) -> Self {
        let saved = SavedJobCollection::new(store.clone());
        let history =
            SearchHistoryCollection::with_max_items(store.clone(), clock.clone(), config.history.max_items);
        let search = MockJobSearch::new(config.search.min_results, config.search.max_results)
            .with_clock(clock);
        let last_results = load_list(store.as_ref(), LAST_RESULTS_KEY);

        Self {
            store,
            saved,
            history,
            search,
            last_results,
        }
    }

    /// Run a search from user input.
    ///
    /// Both inputs are trimmed. A blank keyword does nothing and yields
    /// `Ok(None)`; otherwise the search is recorded in history first.
    pub fn search(&mut self, keyword: &str, location: &str) -> Result<Option<&[JobRecord]>, SearchError> {
        let keyword = keyword.trim();
        let location = location.trim();
        if keyword.is_empty() {
            return Ok(None);
        }

        self.history.record(keyword, location);

        let request = SearchRequest::new(
            keyword,
            (!location.is_empty()).then(|| location.to_string()),
        );
        let jobs = self.search.search(&request)?;
        info!(target: "search", "Search '{}' in '{}' returned {} jobs", keyword, location, jobs.len());

        self.last_results = jobs;
        write_list(self.store.as_ref(), LAST_RESULTS_KEY, &self.last_results);
        Ok(Some(self.last_results.as_slice()))
    }

    /// Search again with the terms of the `index`-th history entry.
    pub fn rerun(&mut self, index: usize) -> Result<Option<&[JobRecord]>, SearchError> {
        let Some(query) = self.history.get(index).cloned() else {
            return Ok(None);
        };
        self.search(&query.keyword, &query.location)
    }

    pub fn last_results(&self) -> &[JobRecord] {
        &self.last_results
    }

    pub fn toggle_saved(&mut self, job: JobRecord) -> bool {
        self.saved.toggle(job)
    }

    /// Toggle the `index`-th listing of the last search.
    /// `None` when there is no such listing.
    pub fn toggle_result(&mut self, index: usize) -> Option<(JobRecord, bool)> {
        let job = self.last_results.get(index)?.clone();
        let saved = self.saved.toggle(job.clone());
        Some((job, saved))
    }

    pub fn is_saved(&self, id: &str) -> bool {
        self.saved.contains(id)
    }

    pub fn saved(&self) -> &SavedJobCollection {
        &self.saved
    }

    pub fn history(&self) -> &[SearchQuery] {
        self.history.entries()
    }

    pub fn clear_saved(&mut self) {
        self.saved.clear();
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Forget everything: saved jobs, history and the last results.
    pub fn clear_all(&mut self) {
        self.saved.clear();
        self.history.clear();
        self.last_results.clear();
        remove_key(self.store.as_ref(), LAST_RESULTS_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;

    fn board(store: &MemoryStore) -> JobBoard {
        JobBoard::with_clock(Arc::new(store.clone()), &Config::default(), Arc::new(ManualClock::new(1_000)))
    }

    #[test]
    fn test_blank_keyword_is_ignored() {
        let store = MemoryStore::new();
        let mut board = board(&store);

        assert_eq!(board.search("   ", "Berlin").unwrap(), None);
        assert!(board.history().is_empty());
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_search_trims_and_records() {
        let store = MemoryStore::new();
        let mut board = board(&store);

        let count = board.search("  Rust ", " Berlin ").unwrap().unwrap().len();
        assert!((5..=12).contains(&count));
        assert_eq!(board.history()[0].keyword, "Rust");
        assert_eq!(board.history()[0].location, "Berlin");
        assert!(board
            .last_results()
            .iter()
            .all(|j| j.location.as_deref() == Some("Berlin")));
        assert!(store.contains_key(LAST_RESULTS_KEY));
    }

    #[test]
    fn test_toggle_result() {
        let store = MemoryStore::new();
        let mut board = board(&store);
        board.search("Rust", "").unwrap();

        let (job, saved) = board.toggle_result(0).unwrap();
        assert!(saved);
        assert!(board.is_saved(&job.id));

        let (_, saved) = board.toggle_result(0).unwrap();
        assert!(!saved);
        assert!(board.toggle_result(99).is_none());
    }

    #[test]
    fn test_last_results_survive_reopen() {
        let store = MemoryStore::new();
        let first_ids: Vec<String> = {
            let mut board = board(&store);
            board.search("Rust", "").unwrap();
            board.last_results().iter().map(|j| j.id.clone()).collect()
        };

        let board = board(&store);
        let ids: Vec<String> = board.last_results().iter().map(|j| j.id.clone()).collect();
        assert_eq!(ids, first_ids);
    }

    #[test]
    fn test_clear_all_empties_store() {
        let store = MemoryStore::new();
        let mut board = board(&store);
        board.search("Rust", "").unwrap();
        board.toggle_result(0).unwrap();

        board.clear_all();
        assert!(store.keys().is_empty());
        assert!(board.saved().is_empty());
        assert!(board.last_results().is_empty());
    }
}
