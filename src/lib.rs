pub mod clock;
pub mod config;
pub mod job;
pub mod job_board;
pub mod logging;
pub mod mock_search;
pub mod persisted;
pub mod saved_jobs;
pub mod search_history;
pub mod store;
pub mod utils;

pub use job::JobRecord;
pub use job_board::JobBoard;
pub use saved_jobs::SavedJobCollection;
pub use search_history::{SearchHistoryCollection, SearchQuery};
pub use store::{FileStore, KeyValueStore, MemoryStore, SharedStore, StoreError};
