//! Prometheus metrics for sketch-server.
//!
//! Provides metrics collection and a Prometheus-compatible `/metrics` endpoint.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use sketch_core::ConversionReport;

// Metric names as constants for consistency
const CONVERSIONS_TOTAL: &str = "sketch_conversions_total";
const CONVERSION_DURATION: &str = "sketch_conversion_duration_seconds";
const SHAPES_OBSERVED_TOTAL: &str = "sketch_shapes_observed_total";
const SHAPES_REJECTED_TOTAL: &str = "sketch_shapes_rejected_total";
const SHAPES_NOISE_TOTAL: &str = "sketch_shapes_noise_total";
const DUPLICATES_REMOVED_TOTAL: &str = "sketch_duplicates_removed_total";
const COMPONENTS_TOTAL: &str = "sketch_components_total";
const INTEGRITY_ERRORS_TOTAL: &str = "sketch_integrity_errors_total";
const VALIDATION_FAILURES_TOTAL: &str = "sketch_validation_failures_total";

/// Initialize metrics and return the Prometheus handle.
///
/// # Errors
///
/// Returns an error if the Prometheus recorder cannot be installed
/// (e.g., if another recorder is already installed).
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Record the counts of one finished conversion.
///
/// # Arguments
///
/// * `endpoint` - "convert" or "design"
/// * `report` - The conversion report
pub fn record_conversion(endpoint: &'static str, report: &ConversionReport) {
    counter!(CONVERSIONS_TOTAL, "endpoint" => endpoint).increment(1);
    counter!(SHAPES_OBSERVED_TOTAL, "endpoint" => endpoint).increment(report.observed as u64);
    counter!(SHAPES_REJECTED_TOTAL, "endpoint" => endpoint)
        .increment(report.rejected.len() as u64);
    counter!(SHAPES_NOISE_TOTAL).increment(report.noise_filtered as u64);
    counter!(DUPLICATES_REMOVED_TOTAL, "endpoint" => endpoint)
        .increment(report.duplicates.len() as u64);
    counter!(INTEGRITY_ERRORS_TOTAL).increment(report.integrity_errors.len() as u64);

    for (kind, count) in &report.types {
        counter!(COMPONENTS_TOTAL, "type" => kind.as_str()).increment(*count as u64);
    }
}

/// Record how long a conversion took.
pub fn record_conversion_duration(endpoint: &'static str, duration_secs: f64) {
    histogram!(CONVERSION_DURATION, "endpoint" => endpoint).record(duration_secs);
}

/// Record an input validation failure.
///
/// # Arguments
///
/// * `validation_type` - Limit that was broken (shape_count, text, id, kind)
pub fn record_validation_failure(validation_type: &'static str) {
    counter!(VALIDATION_FAILURES_TOTAL, "type" => validation_type).increment(1);
}
