//! Search index management

use crate::search::error::{SearchError, SearchResult};
use crate::search::schema::course_index_mapping;
use crate::store::DocumentStore;
use std::sync::Arc;
use tracing::{debug, info};

/// Ensures the course index exists with the expected mapping
pub struct IndexManager {
    store: Arc<dyn DocumentStore>,
    index_name: String,
}

impl IndexManager {
    pub fn new(store: Arc<dyn DocumentStore>, index_name: impl Into<String>) -> Self {
        Self {
            store,
            index_name: index_name.into(),
        }
    }

    /// Create the index if it is missing.
    ///
    /// Returns `true` when the index was created by this call and `false`
    /// when it already existed. An existing index is never modified.
    pub async fn ensure_index(&self) -> SearchResult<bool> {
        if self.store.exists(&self.index_name).await? {
            debug!(index = %self.index_name, "Index already exists");
            return Ok(false);
        }

        self.store
            .create_index(&self.index_name, &course_index_mapping())
            .await
            .map_err(|e| match e {
                SearchError::IndexCreationFailed(_) => e,
                other => SearchError::IndexCreationFailed(other.to_string()),
            })?;

        info!(index = %self.index_name, "Created course index");
        Ok(true)
    }
}
