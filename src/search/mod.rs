//! Course search over a document store
//!
//! This module turns caller filters into store queries and shapes the
//! results:
//!
//! - **Query building**: free text with fuzzy matching, exact filters,
//!   age-band overlap, price and date windows, sorting and paging
//! - **Execution**: runs a query and maps hits to [`CourseRecord`]s,
//!   degrading to an empty page when the store fails
//! - **Suggestions**: deduplicated title completions, via a completion
//!   field or a case-insensitive title prefix
//! - **Bulk indexing**: batch writes with the autocomplete input derived
//!   from each title
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              SearchService                       │
//! ├─────────────────────────────────────────────────┤
//! │  - search()      - suggest()                     │
//! │  - bulk_index()  - ensure_index()                │
//! └─────────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────────┐
//! │  QueryBuilder → SearchExecutor                   │
//! │  SuggestionEngine   BulkIndexer   IndexManager   │
//! └─────────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────────┐
//! │        DocumentStore (Elasticsearch, memory)     │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use course_search::search::{SearchConfig, SearchQuery, SearchService, SortMode};
//! use course_search::store::InMemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = SearchService::new(Arc::new(InMemoryStore::new()), SearchConfig::default());
//!
//!     let query = SearchQuery::new()
//!         .with_text("math")
//!         .with_age_range(Some(7), Some(9))
//!         .with_sort(SortMode::PriceAsc)
//!         .with_page(0, 20);
//!
//!     let page = service.search(&query).await;
//!     println!("Found {} courses", page.total);
//! }
//! ```
//!
//! [`CourseRecord`]: crate::models::CourseRecord

mod config;
mod error;
mod executor;
mod index;
mod indexer;
mod query;
pub mod schema;
mod service;
mod suggest;

pub use config::{SearchConfig, SearchConfigBuilder, SuggestStrategy, MAX_SUGGESTIONS};
pub use error::{SearchError, SearchResult};
pub use executor::{SearchExecutor, SearchPage};
pub use index::IndexManager;
pub use indexer::{BulkIndexer, BulkSummary};
pub use query::{
    BoolQuery, BoostedField, Fuzziness, QueryBuilder, QueryClause, QuerySpec, RangeValue,
    SearchQuery, SortMode, SortOrder, SortSpec,
};
pub use schema::{course_index_mapping, fields};
pub use service::SearchService;
pub use suggest::SuggestionEngine;
