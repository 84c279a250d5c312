//! Startup catalog loading

use crate::config::{CatalogConfig, Config};
use crate::error::{AppError, Result};
use crate::models::CourseRecord;
use crate::search::{BulkSummary, SearchService};
use crate::store::create_store;
use std::path::Path;
use tracing::{error, info};

/// Read a JSON array of courses from `path`
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<CourseRecord>> {
    let path = path.as_ref();

    let raw = std::fs::read_to_string(path).map_err(|e| AppError::CatalogLoad {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    serde_json::from_str(&raw).map_err(|e| AppError::CatalogLoad {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Ensure the index exists, then load and index the configured catalog.
///
/// Returns `Ok(None)` when no catalog path is configured. Index creation
/// failures are logged and do not stop the load; catalog read or parse
/// failures are returned.
pub async fn bootstrap(
    service: &SearchService,
    config: &CatalogConfig,
) -> Result<Option<BulkSummary>> {
    let Some(path) = config.path.as_ref() else {
        info!("No catalog configured, skipping bootstrap");
        return Ok(None);
    };

    match service.ensure_index().await {
        Ok(true) => info!(index = %service.index_name(), "Index created"),
        Ok(false) => {}
        Err(e) => error!(index = %service.index_name(), error = %e, "Failed to ensure index"),
    }

    let courses = load_catalog(path)?;
    info!(path = %path.display(), courses = courses.len(), "Loaded catalog");

    let summary = service.bulk_index(courses).await;
    Ok(Some(summary))
}

/// Index a catalog file into the store described by `config`.
///
/// Unlike [`bootstrap`], a failure to ensure the index is returned.
pub async fn index_file(config: &Config, path: impl AsRef<Path>) -> Result<BulkSummary> {
    let store = create_store(&config.store)?;
    let service = SearchService::new(store, config.search.clone());

    service.ensure_index().await?;
    let courses = load_catalog(path)?;
    Ok(service.bulk_index(courses).await)
}
