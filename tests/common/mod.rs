//! Shared fixtures for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use course_search::models::CourseRecord;
use course_search::search::{QuerySpec, SearchConfig, SearchError, SearchResult, SearchService};
use course_search::store::{
    BulkOperation, BulkResponse, DocumentStore, InMemoryStore, SearchHits, SuggestOption,
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn date(value: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(value).unwrap()
}

/// Build a fully populated course
#[allow(clippy::too_many_arguments)]
pub fn course(
    id: &str,
    title: &str,
    category: &str,
    course_type: &str,
    ages: (i32, i32),
    price: f64,
    next_session: &str,
) -> CourseRecord {
    CourseRecord {
        id: id.to_string(),
        title: Some(title.to_string()),
        description: Some(format!("{} for curious kids", title)),
        category: Some(category.to_string()),
        course_type: Some(course_type.to_string()),
        grade_range: None,
        min_age: Some(ages.0),
        max_age: Some(ages.1),
        price: Some(price),
        next_session_date: Some(date(next_session)),
        suggest: None,
    }
}

pub fn sample_courses() -> Vec<CourseRecord> {
    vec![
        course("c-1", "Math Explorers", "Math", "COURSE", (6, 10), 100.0, "2025-06-10T15:00:00Z"),
        course("c-2", "Math Wizards", "Math", "CLUB", (9, 13), 150.0, "2025-06-01T15:00:00Z"),
        course("c-3", "Science Quest", "Science", "ONE_TIME", (7, 11), 45.0, "2025-07-04T10:00:00-04:00"),
        course("c-4", "Art Studio", "Art", "COURSE", (5, 8), 80.0, "2025-06-20T09:30:00Z"),
    ]
}

/// A service over a fresh in-memory store
pub fn memory_service() -> (Arc<InMemoryStore>, SearchService) {
    let store = Arc::new(InMemoryStore::new());
    let service = SearchService::new(store.clone(), SearchConfig::default());
    (store, service)
}

/// A service with the sample catalog already indexed
pub async fn seeded_service() -> SearchService {
    let (_, service) = memory_service();
    service.ensure_index().await.unwrap();
    let summary = service.bulk_index(sample_courses()).await;
    assert!(summary.is_success(), "seeding failed: {:?}", summary.errors);
    service
}

/// Store double whose every call fails
#[derive(Default)]
pub struct FailingStore {
    pub calls: AtomicUsize,
}

impl FailingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> SearchResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SearchError::StoreUnavailable("connection refused".to_string()))
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn exists(&self, _index: &str) -> SearchResult<bool> {
        self.fail()
    }

    async fn create_index(&self, _index: &str, _mapping: &Value) -> SearchResult<()> {
        self.fail()
    }

    async fn bulk_write(
        &self,
        _index: &str,
        _operations: Vec<BulkOperation>,
    ) -> SearchResult<BulkResponse> {
        self.fail()
    }

    async fn search(&self, _index: &str, _query: &QuerySpec) -> SearchResult<SearchHits> {
        self.fail()
    }

    async fn suggest(
        &self,
        _index: &str,
        _field: &str,
        _prefix: &str,
        _size: usize,
    ) -> SearchResult<Vec<SuggestOption>> {
        self.fail()
    }
}
