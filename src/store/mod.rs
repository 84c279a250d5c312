//! Document store client capability
//!
//! Every search component receives an `Arc<dyn DocumentStore>` at
//! construction time. Two implementations ship with the crate:
//!
//! - [`ElasticsearchStore`]: JSON over HTTP against an Elasticsearch cluster
//! - [`InMemoryStore`]: an embedded evaluator of the same query contract

mod elasticsearch;
mod memory;

pub use elasticsearch::ElasticsearchStore;
pub use memory::InMemoryStore;

use crate::config::{StoreBackend, StoreConfig};
use crate::search::{QuerySpec, SearchError, SearchResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// A single action inside a bulk write
#[derive(Debug, Clone, PartialEq)]
pub enum BulkOperation {
    /// Create or replace the document stored under `id`
    Index { id: String, document: Value },
}

impl BulkOperation {
    pub fn id(&self) -> &str {
        match self {
            BulkOperation::Index { id, .. } => id,
        }
    }
}

/// Outcome of one bulk action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItemResult {
    pub id: String,
    pub status: u16,
    pub error: Option<String>,
}

impl BulkItemResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && (200..300).contains(&self.status)
    }
}

/// Store answer to a bulk write
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkResponse {
    /// True when at least one item failed
    pub errors: bool,
    pub items: Vec<BulkItemResult>,
}

/// A raw search hit; `source` is absent when the store returned no body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHit {
    pub id: String,
    pub source: Option<Value>,
}

/// Raw page of hits plus the store-reported total
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHits {
    pub hits: Vec<RawHit>,
    pub total: Option<u64>,
}

/// A completion candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestOption {
    pub text: String,
}

/// Operations the search components need from the document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Whether the index exists
    async fn exists(&self, index: &str) -> SearchResult<bool>;

    /// Create the index with the given mapping
    async fn create_index(&self, index: &str, mapping: &Value) -> SearchResult<()>;

    /// Submit a batch of operations in one request
    async fn bulk_write(&self, index: &str, operations: Vec<BulkOperation>)
        -> SearchResult<BulkResponse>;

    /// Run a structured query
    async fn search(&self, index: &str, query: &QuerySpec) -> SearchResult<SearchHits>;

    /// Prefix completion against a completion field, duplicates skipped
    async fn suggest(
        &self,
        index: &str,
        field: &str,
        prefix: &str,
        size: usize,
    ) -> SearchResult<Vec<SuggestOption>>;
}

/// Create a document store based on configuration
pub fn create_store(config: &StoreConfig) -> SearchResult<Arc<dyn DocumentStore>> {
    match config.backend {
        StoreBackend::Elasticsearch => {
            if config.url.trim().is_empty() {
                return Err(SearchError::InvalidConfiguration(
                    "Elasticsearch backend requires 'url' configuration".to_string(),
                ));
            }

            tracing::info!(url = %config.url, "Initializing Elasticsearch document store");

            let store = ElasticsearchStore::new(
                &config.url,
                Duration::from_secs(config.request_timeout_secs),
            )?;
            Ok(Arc::new(store))
        }

        StoreBackend::Memory => {
            tracing::info!("Initializing in-memory document store");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_memory_store() {
        let config = StoreConfig {
            backend: StoreBackend::Memory,
            ..Default::default()
        };
        assert!(create_store(&config).is_ok());
    }

    #[test]
    fn test_elasticsearch_requires_url() {
        let config = StoreConfig {
            backend: StoreBackend::Elasticsearch,
            url: " ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            create_store(&config),
            Err(SearchError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_bulk_item_success() {
        let ok = BulkItemResult {
            id: "a".into(),
            status: 201,
            error: None,
        };
        let failed = BulkItemResult {
            id: "b".into(),
            status: 400,
            error: Some("mapper_parsing_exception".into()),
        };
        assert!(ok.is_success());
        assert!(!failed.is_success());
    }
}
