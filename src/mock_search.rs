//! Stand-in job search endpoint that fabricates listings.
//!
//! There is no job board behind this: results are drawn at random from fixed
//! word lists so the rest of the application has something to show.

use crate::clock::{Clock, SystemClock};
use crate::job::JobRecord;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

const COMPANIES: &[&str] = &[
    "TechCorp",
    "DevSolutions",
    "InnovateTech",
    "CodeMasters",
    "WebFuture",
    "DigitalWave",
    "CloudNine",
];

const LOCATIONS: &[&str] = &[
    "Remote",
    "New York",
    "San Francisco",
    "London",
    "Berlin",
    "Tokyo",
    "Sydney",
];

const BUDGETS: &[&str] = &[
    "$50-70/hr",
    "$80-100/hr",
    "$60k-80k/year",
    "$90k-120k/year",
    "$120k-150k/year",
    "Negotiable",
];

const POSTED: &[&str] = &[
    "2 hours ago",
    "1 day ago",
    "3 days ago",
    "Just now",
    "1 week ago",
    "2 days ago",
    "5 hours ago",
];

const POSITIONS: &[&str] = &[
    "Developer",
    "Engineer",
    "Specialist",
    "Architect",
    "Consultant",
    "Lead",
    "Senior Developer",
    "Full Stack Developer",
    "UI/UX Designer",
];

const JOB_URL: &str = "https://example.com/job";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub keyword: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl SearchRequest {
    pub fn new(keyword: impl Into<String>, location: Option<String>) -> Self {
        Self {
            keyword: keyword.into(),
            location,
        }
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("Keyword is required")]
    MissingKeyword,
}

/// Status code and JSON body, shaped like the HTTP route this replaces.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn message(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "message": message }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub struct MockJobSearch {
    min_results: usize,
    max_results: usize,
    clock: Arc<dyn Clock>,
}

impl Default for MockJobSearch {
    fn default() -> Self {
        Self::new(5, 12)
    }
}

impl MockJobSearch {
    /// Bounds are inclusive; they are swapped if given in the wrong order.
    pub fn new(min_results: usize, max_results: usize) -> Self {
        let (min_results, max_results) = if min_results <= max_results {
            (min_results, max_results)
        } else {
            (max_results, min_results)
        };
        Self {
            min_results,
            max_results,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn search(&self, request: &SearchRequest) -> Result<Vec<JobRecord>, SearchError> {
        if request.keyword.is_empty() {
            return Err(SearchError::MissingKeyword);
        }

        let mut rng = rand::thread_rng();
        let count = rng.gen_range(self.min_results..=self.max_results);
        let stamp = self.clock.now_millis();
        let location = request.location.as_deref().filter(|l| !l.is_empty());

        let jobs: Vec<JobRecord> = (0..count)
            .map(|i| {
                let position = pick(&mut rng, POSITIONS);
                let job = JobRecord::new(
                    format!("job-{}-{}", stamp, i),
                    format!("{} {}", request.keyword, position),
                    pick(&mut rng, COMPANIES),
                    JOB_URL,
                    pick(&mut rng, POSTED),
                )
                .with_budget(pick(&mut rng, BUDGETS));

                match location {
                    Some(location) => job.with_location(location),
                    None => job.with_location(pick(&mut rng, LOCATIONS)),
                }
            })
            .collect();

        debug!(target: "search", "Generated {} jobs for '{}'", jobs.len(), request.keyword);
        Ok(jobs)
    }

    /// Answer a raw request the way the HTTP route did: POST with a JSON body.
    pub fn handle(&self, method: &str, body: &str) -> ApiResponse {
        if !method.eq_ignore_ascii_case("POST") {
            return ApiResponse::message(405, "Method not allowed");
        }

        let request: SearchRequest = match serde_json::from_str(body) {
            Ok(request) => request,
            Err(e) => {
                error!(target: "search", "Error in search-jobs request: {}", e);
                return ApiResponse::message(500, "Internal server error");
            }
        };

        match self.search(&request) {
            Ok(jobs) => match serde_json::to_value(jobs) {
                Ok(body) => ApiResponse { status: 200, body },
                Err(e) => {
                    error!(target: "search", "Error encoding search results: {}", e);
                    ApiResponse::message(500, "Internal server error")
                }
            },
            Err(e @ SearchError::MissingKeyword) => ApiResponse::message(400, &e.to_string()),
        }
    }
}

fn pick<R: Rng>(rng: &mut R, options: &[&str]) -> String {
    options.choose(rng).copied().unwrap_or_default().to_string()
}
