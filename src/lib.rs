//! Course search over an Elasticsearch-compatible document store.
//!
//! The [`search`] module builds and runs queries, produces title
//! suggestions and bulk-indexes course records. [`store`] holds the
//! document store seam, and [`api`] exposes everything over HTTP.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod search;
pub mod store;

pub use error::{AppError, Result};
