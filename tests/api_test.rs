//! HTTP surface tests driven through the router with `oneshot`

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use common::*;
use course_search::api::{build_router, AppState};
use course_search::search::{SearchConfig, SearchService};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

async fn app() -> Router {
    let service = Arc::new(seeded_service().await);
    build_router(AppState::new(service).with_max_page_size(50))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(app().await, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["index"], "courses");
}

#[tokio::test]
async fn test_search_endpoint() {
    let (status, body) = get(
        app().await,
        "/api/search?q=math&minAge=8&maxAge=12&sort=priceDesc&page=0&size=10",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["courses"][0]["id"], "c-2");
    assert_eq!(body["courses"][0]["type"], "CLUB");
    assert_eq!(body["courses"][1]["minAge"], 6);
}

#[tokio::test]
async fn test_search_defaults() {
    let (status, body) = get(app().await, "/api/search").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);
    // Upcoming is the default order
    assert_eq!(body["courses"][0]["id"], "c-2");
}

#[tokio::test]
async fn test_search_filters_from_query_string() {
    let (_, body) = get(
        app().await,
        "/api/search?category=Math&type=COURSE&minPrice=50&maxPrice=120",
    )
    .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["courses"][0]["id"], "c-1");

    let (_, body) = get(
        app().await,
        "/api/search?startDate=2025-06-15T00:00:00%2B00:00",
    )
    .await;
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn test_non_finite_prices_are_ignored() {
    let (status, body) = get(app().await, "/api/search?minPrice=NaN&maxPrice=inf").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);
}

#[tokio::test]
async fn test_search_rejects_bad_parameters() {
    let (status, body) = get(app().await, "/api/search?size=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = get(app().await, "/api/search?size=51").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let long = "a".repeat(300);
    let (status, _) = get(app().await, &format!("/api/search?q={}", long)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(app().await, "/api/search?startDate=tomorrow").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_suggest_endpoint() {
    let (status, body) = get(app().await, "/api/search/suggest?q=Math").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!(["Math Explorers", "Math Wizards"])
    );

    let (status, body) = get(app().await, "/api/search/suggest").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_store_failure_is_not_an_http_error() {
    let service = Arc::new(SearchService::new(
        Arc::new(FailingStore::default()),
        SearchConfig::default(),
    ));
    let app = build_router(AppState::new(service));

    let (status, body) = get(app.clone(), "/api/search?q=math").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "total": 0, "courses": [] }));

    let (status, body) = get(app, "/api/search/suggest?q=math").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let _ = course_search::metrics::init_metrics();
    let app = app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("course_search_requests_total"));

    let disabled = build_router(
        AppState::new(Arc::new(seeded_service().await)).with_metrics(false),
    );
    let (status, _) = get(disabled, "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
