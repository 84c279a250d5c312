//! Error types for search operations

use crate::error::AppError;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while talking to the document store
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Network or protocol failure talking to the store
    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),

    /// Store did not answer within the configured timeout
    #[error("Document store request timed out: {0}")]
    Timeout(String),

    /// Store rejected the query
    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    /// A response or hit could not be mapped
    #[error("Deserialization failed: {0}")]
    Deserialization(String),

    /// Index not found
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// Index creation failed
    #[error("Index creation failed: {0}")]
    IndexCreationFailed(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SearchError::Timeout(err.to_string())
        } else if err.is_decode() {
            SearchError::Deserialization(err.to_string())
        } else {
            SearchError::StoreUnavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::Deserialization(err.to_string())
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidConfiguration(msg) => AppError::Configuration(msg),
            SearchError::Timeout(msg) => AppError::Timeout(msg),
            SearchError::StoreUnavailable(msg) => AppError::Network(msg),
            _ => AppError::Internal(err.to_string()),
        }
    }
}
