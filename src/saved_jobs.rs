use crate::job::JobRecord;
use crate::persisted::{load_list, remove_key, write_list};
use crate::store::SharedStore;
use tracing::info;

/// Store key holding the serialized saved-job list.
pub const SAVED_JOBS_KEY: &str = "savedJobs";

/// Jobs the user bookmarked, mirrored to the store after every change.
///
/// Saving and unsaving go through a single [`toggle`](Self::toggle); callers
/// check [`contains`](Self::contains) to know which one a toggle will do.
pub struct SavedJobCollection {
    jobs: Vec<JobRecord>,
    store: SharedStore,
}

impl SavedJobCollection {
    /// Create the collection and hydrate it from `store`.
    pub fn new(store: SharedStore) -> Self {
        let jobs = load_list(store.as_ref(), SAVED_JOBS_KEY);
        Self { jobs, store }
    }

    /// Save `job` if its id is not present, otherwise remove the saved one.
    ///
    /// Returns `true` when the job is saved after the call.
    pub fn toggle(&mut self, job: JobRecord) -> bool {
        // Stored lists may repeat an id; unsaving drops every copy
        let saved = if self.contains(&job.id) {
            self.jobs.retain(|saved| saved.id != job.id);
            false
        } else {
            self.jobs.push(job);
            true
        };

        self.persist();
        saved
    }

    pub fn contains(&self, id: &str) -> bool {
        self.jobs.iter().any(|job| job.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&JobRecord> {
        self.jobs.iter().find(|job| job.id == id)
    }

    pub fn jobs(&self) -> &[JobRecord] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Drop everything and remove the store entry.
    pub fn clear(&mut self) {
        self.jobs.clear();
        if remove_key(self.store.as_ref(), SAVED_JOBS_KEY) {
            info!(target: "storage", "Cleared saved jobs");
        }
    }

    /// Replace the in-memory list with what the store currently holds.
    pub fn reload(&mut self) {
        self.jobs = load_list(self.store.as_ref(), SAVED_JOBS_KEY);
    }

    fn persist(&self) {
        write_list(self.store.as_ref(), SAVED_JOBS_KEY, &self.jobs);
    }
}
