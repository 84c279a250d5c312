//! Prometheus metrics for the search paths.
//!
//! Counters and histograms are process-global and registered in
//! [`PROMETHEUS_REGISTRY`] by [`init_metrics`]. Recording works before
//! registration; the values just aren't exported until then.
//!
//! # Example
//! ```no_run
//! use course_search::metrics::{self, REQUESTS_TOTAL};
//!
//! metrics::init_metrics().ok();
//! REQUESTS_TOTAL.with_label_values(&["search", "success"]).inc();
//! println!("{}", metrics::gather_metrics());
//! ```

use lazy_static::lazy_static;
use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry};
use std::time::Instant;

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Requests per core operation
    ///
    /// Labels: operation (search, suggest, bulk_index), outcome (success, degraded, empty)
    pub static ref REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("requests_total", "Total number of search, suggest and bulk index calls")
            .namespace("course_search"),
        &["operation", "outcome"]
    ).expect("Failed to create REQUESTS_TOTAL metric");

    /// Store round-trip latency in seconds
    ///
    /// Labels: operation
    pub static ref DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new("duration_seconds", "Document store round-trip duration in seconds")
            .namespace("course_search")
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["operation"]
    ).expect("Failed to create DURATION_SECONDS metric");

    /// Documents submitted through bulk indexing
    ///
    /// Labels: outcome (indexed, failed)
    pub static ref DOCUMENTS_INDEXED_TOTAL: CounterVec = CounterVec::new(
        Opts::new("documents_indexed_total", "Total number of documents submitted for indexing")
            .namespace("course_search"),
        &["outcome"]
    ).expect("Failed to create DOCUMENTS_INDEXED_TOTAL metric");
}

/// Register all metrics with the global registry
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(DURATION_SECONDS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(DOCUMENTS_INDEXED_TOTAL.clone()))?;
    Ok(())
}

/// Record one completed operation
pub fn record_operation(operation: &str, outcome: &str, started: Instant) {
    REQUESTS_TOTAL.with_label_values(&[operation, outcome]).inc();
    DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(started.elapsed().as_secs_f64());
}

/// Export metrics in Prometheus text format
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initialization() {
        // Registration is global, so another test may have registered first
        let _ = init_metrics();
        assert!(matches!(
            init_metrics(),
            Err(prometheus::Error::AlreadyReg)
        ));

        // Vec families only export once a labelled child exists
        record_operation("init_check", "success", Instant::now());
        DOCUMENTS_INDEXED_TOTAL.with_label_values(&["indexed"]).inc();

        let exported = gather_metrics();
        assert!(exported.contains("course_search_requests_total"));
        assert!(exported.contains("course_search_duration_seconds"));
        assert!(exported.contains("course_search_documents_indexed_total"));
    }

    #[test]
    fn test_record_operation() {
        let before = REQUESTS_TOTAL
            .with_label_values(&["test_op", "success"])
            .get();
        record_operation("test_op", "success", Instant::now());
        let after = REQUESTS_TOTAL
            .with_label_values(&["test_op", "success"])
            .get();
        assert_eq!(after, before + 1.0);
    }
}
