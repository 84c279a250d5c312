//! Bulk indexing of course records

use crate::metrics::{self, DOCUMENTS_INDEXED_TOTAL};
use crate::models::CourseRecord;
use crate::store::{BulkOperation, DocumentStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Outcome of a bulk indexing call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkSummary {
    /// Records in the batch
    pub total: usize,

    /// Records not indexed (rejected locally or by the store)
    pub failed: usize,

    /// One message per failure
    pub errors: Vec<String>,
}

impl BulkSummary {
    pub fn indexed(&self) -> usize {
        self.total.saturating_sub(self.failed)
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Writes batches of courses with one index action per record
pub struct BulkIndexer {
    store: Arc<dyn DocumentStore>,
    index_name: String,
}

impl BulkIndexer {
    pub fn new(store: Arc<dyn DocumentStore>, index_name: impl Into<String>) -> Self {
        Self {
            store,
            index_name: index_name.into(),
        }
    }

    /// Index a batch in a single bulk request.
    ///
    /// `suggest` is re-derived from `title` for every record before the
    /// write. Records without an id are rejected locally. Failures are
    /// logged and reported in the summary; nothing is retried.
    pub async fn bulk_index(&self, courses: Vec<CourseRecord>) -> BulkSummary {
        let started = Instant::now();
        let mut summary = BulkSummary {
            total: courses.len(),
            ..Default::default()
        };
        let mut operations = Vec::with_capacity(courses.len());

        for course in courses {
            let course = course.with_derived_suggest();

            if course.id.trim().is_empty() {
                warn!(title = %course.title_str(), "Rejecting course without id");
                summary.failed += 1;
                summary
                    .errors
                    .push(format!("course '{}' has no id", course.title_str()));
                continue;
            }

            match serde_json::to_value(&course) {
                Ok(document) => operations.push(BulkOperation::Index {
                    id: course.id.clone(),
                    document,
                }),
                Err(e) => {
                    warn!(id = %course.id, error = %e, "Failed to serialize course");
                    summary.failed += 1;
                    summary.errors.push(format!("{}: {}", course.id, e));
                }
            }
        }

        if operations.is_empty() {
            debug!(index = %self.index_name, "Nothing to index");
            self.record(&summary, started);
            return summary;
        }

        let submitted = operations.len();
        match self.store.bulk_write(&self.index_name, operations).await {
            Ok(response) => {
                let before = summary.failed;
                for item in response.items.iter().filter(|i| !i.is_success()) {
                    let reason = item.error.as_deref().unwrap_or("unknown error");
                    warn!(id = %item.id, status = item.status, reason = %reason, "Bulk item failed");
                    summary.failed += 1;
                    summary.errors.push(format!("{}: {}", item.id, reason));
                }

                if response.errors && summary.failed == before {
                    warn!(index = %self.index_name, "Store reported bulk errors without item details");
                }

                info!(
                    index = %self.index_name,
                    indexed = summary.indexed(),
                    failed = summary.failed,
                    "Bulk indexing complete"
                );
            }
            Err(e) => {
                error!(
                    operation = "bulk_index",
                    index = %self.index_name,
                    documents = submitted,
                    error = %e,
                    "Bulk indexing failed"
                );
                summary.failed += submitted;
                summary.errors.push(e.to_string());
            }
        }

        self.record(&summary, started);
        summary
    }

    fn record(&self, summary: &BulkSummary, started: Instant) {
        DOCUMENTS_INDEXED_TOTAL
            .with_label_values(&["indexed"])
            .inc_by(summary.indexed() as f64);
        DOCUMENTS_INDEXED_TOTAL
            .with_label_values(&["failed"])
            .inc_by(summary.failed as f64);

        let outcome = if summary.is_success() { "success" } else { "degraded" };
        metrics::record_operation("bulk_index", outcome, started);
    }
}
