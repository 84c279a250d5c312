//! Main search service implementation

use crate::models::CourseRecord;
use crate::search::config::SearchConfig;
use crate::search::error::SearchResult;
use crate::search::executor::{SearchExecutor, SearchPage};
use crate::search::index::IndexManager;
use crate::search::indexer::{BulkIndexer, BulkSummary};
use crate::search::query::{QueryBuilder, SearchQuery};
use crate::search::suggest::SuggestionEngine;
use crate::store::DocumentStore;
use std::sync::Arc;

/// Facade over query building, execution, suggestion and indexing.
///
/// All components share one store handle and one index name.
pub struct SearchService {
    config: SearchConfig,
    builder: QueryBuilder,
    executor: SearchExecutor,
    suggestions: SuggestionEngine,
    indexer: BulkIndexer,
    index_manager: IndexManager,
}

impl SearchService {
    pub fn new(store: Arc<dyn DocumentStore>, config: SearchConfig) -> Self {
        let index = config.index_name.clone();

        Self {
            builder: QueryBuilder::new(),
            executor: SearchExecutor::new(store.clone(), index.clone()),
            suggestions: SuggestionEngine::new(
                store.clone(),
                index.clone(),
                config.suggest_strategy,
                config.effective_suggest_limit(),
            ),
            indexer: BulkIndexer::new(store.clone(), index.clone()),
            index_manager: IndexManager::new(store, index),
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn index_name(&self) -> &str {
        &self.config.index_name
    }

    /// Search for courses. Store failures yield an empty page.
    pub async fn search(&self, query: &SearchQuery) -> SearchPage {
        let spec = self.builder.build(query);
        tracing::debug!(
            q = ?query.text,
            sort = ?query.sort,
            page = query.page,
            size = query.size,
            "Executing course search"
        );
        self.executor.execute(&spec).await
    }

    /// Title completions for a partial title
    pub async fn suggest(&self, partial: &str) -> Vec<String> {
        self.suggestions.suggest(partial).await
    }

    /// Index a batch of courses
    pub async fn bulk_index(&self, courses: Vec<CourseRecord>) -> BulkSummary {
        self.indexer.bulk_index(courses).await
    }

    /// Create the course index if missing
    pub async fn ensure_index(&self) -> SearchResult<bool> {
        self.index_manager.ensure_index().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::config::SearchConfigBuilder;
    use crate::search::query::SortMode;
    use crate::store::InMemoryStore;

    fn service() -> SearchService {
        let store = Arc::new(InMemoryStore::new());
        SearchService::new(store, SearchConfigBuilder::new().index_name("test-courses").build())
    }

    #[tokio::test]
    async fn test_index_then_search() {
        let service = service();
        service.ensure_index().await.unwrap();

        let mut cheap = CourseRecord::new("c-1", "Math Explorers");
        cheap.price = Some(50.0);
        let mut pricey = CourseRecord::new("c-2", "Math Wizards");
        pricey.price = Some(150.0);

        let summary = service.bulk_index(vec![cheap, pricey]).await;
        assert_eq!(summary.indexed(), 2);

        let page = service
            .search(&SearchQuery::new().with_text("math").with_sort(SortMode::PriceDesc))
            .await;
        assert_eq!(page.total, 2);
        assert_eq!(page.courses[0].id, "c-2");
        assert_eq!(service.index_name(), "test-courses");
    }

    #[tokio::test]
    async fn test_suggest_after_index() {
        let service = service();
        service
            .bulk_index(vec![CourseRecord::new("c-1", "Science Quest")])
            .await;

        assert_eq!(service.suggest("sci").await, vec!["Science Quest".to_string()]);
        assert!(service.suggest("   ").await.is_empty());
    }
}
