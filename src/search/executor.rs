//! Runs built queries against the store and shapes the result page

use crate::metrics;
use crate::models::CourseRecord;
use crate::search::error::SearchResult;
use crate::search::query::QuerySpec;
use crate::store::{DocumentStore, RawHit};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    /// Matches across all pages
    pub total: u64,

    /// Courses in the requested window
    pub courses: Vec<CourseRecord>,
}

impl SearchPage {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Executes `QuerySpec`s against the configured index
pub struct SearchExecutor {
    store: Arc<dyn DocumentStore>,
    index_name: String,
}

impl SearchExecutor {
    pub fn new(store: Arc<dyn DocumentStore>, index_name: impl Into<String>) -> Self {
        Self {
            store,
            index_name: index_name.into(),
        }
    }

    /// Execute a query, degrading to an empty page on any failure
    pub async fn execute(&self, spec: &QuerySpec) -> SearchPage {
        let started = Instant::now();

        match self.try_execute(spec).await {
            Ok(page) => {
                metrics::record_operation("search", "success", started);
                page
            }
            Err(e) => {
                error!(
                    operation = "search",
                    index = %self.index_name,
                    from = spec.from,
                    size = spec.size,
                    error = %e,
                    "Search failed, returning empty page"
                );
                metrics::record_operation("search", "degraded", started);
                SearchPage::empty()
            }
        }
    }

    /// Execute a query and surface store failures
    pub async fn try_execute(&self, spec: &QuerySpec) -> SearchResult<SearchPage> {
        let hits = self.store.search(&self.index_name, spec).await?;

        let courses = hits.hits.into_iter().filter_map(map_hit).collect();

        Ok(SearchPage {
            total: hits.total.unwrap_or(0),
            courses,
        })
    }
}

/// Map a raw hit to a course; hits without a usable body are skipped
fn map_hit(hit: RawHit) -> Option<CourseRecord> {
    let Some(source) = hit.source else {
        debug!(id = %hit.id, "Skipping hit without source");
        return None;
    };

    match serde_json::from_value::<CourseRecord>(source) {
        Ok(mut course) => {
            if course.id.is_empty() {
                course.id = hit.id;
            }
            Some(course)
        }
        Err(e) => {
            warn!(id = %hit.id, error = %e, "Skipping hit that does not map to a course");
            None
        }
    }
}
