use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::metrics::gather_metrics;
use crate::search::{SearchPage, SearchQuery, SortMode};
use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        index: state.service.index_name().to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub index: String,
}

/// Prometheus exposition
pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse> {
    if !state.metrics_enabled {
        return Err(AppError::NotFound("metrics are disabled".to_string()));
    }

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        gather_metrics(),
    ))
}

/// Search courses
pub async fn search_courses(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchPage>> {
    params.validate()?;

    if params.size > state.max_page_size {
        return Err(AppError::Validation(format!(
            "size must be at most {}",
            state.max_page_size
        )));
    }

    let page = state.service.search(&params.into_query()).await;
    Ok(Json(page))
}

/// Suggest course titles for a partial title
pub async fn suggest_titles(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> Result<Json<Vec<String>>> {
    params.validate()?;

    let q = params.q.unwrap_or_default();
    Ok(Json(state.service.suggest(&q).await))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[validate(length(max = 256))]
    pub q: Option<String>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub course_type: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub start_date: Option<DateTime<FixedOffset>>,
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_size")]
    #[validate(range(min = 1))]
    pub size: usize,
}

impl SearchParams {
    fn into_query(self) -> SearchQuery {
        let mut query = SearchQuery::new()
            .with_age_range(self.min_age, self.max_age)
            .with_price_range(self.min_price, self.max_price)
            .with_sort(SortMode::parse(&self.sort))
            .with_page(self.page, self.size);

        if let Some(q) = self.q {
            query = query.with_text(q);
        }
        if let Some(category) = self.category {
            query = query.with_category(category);
        }
        if let Some(course_type) = self.course_type {
            query = query.with_type(course_type);
        }
        if let Some(start_date) = self.start_date {
            query = query.with_start_date(start_date);
        }
        query
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SuggestParams {
    #[validate(length(max = 256))]
    pub q: Option<String>,
}

fn default_sort() -> String {
    "upcoming".to_string()
}

fn default_size() -> usize {
    10
}
