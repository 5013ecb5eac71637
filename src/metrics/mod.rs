//! Metrics for the normalization pipeline
//!
//! Each pipeline phase defines its metrics in a dedicated submodule. The CLI
//! installs an in-process Prometheus recorder so a batch run can render a
//! snapshot to disk when it finishes.

pub mod filter;
pub mod ingest;
pub mod normalize;
pub mod registry;

pub use filter::FilterMetrics;
pub use ingest::IngestMetrics;
pub use normalize::NormalizeMetrics;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing::{info, warn};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder and register every phase's metrics.
///
/// Idempotent; returns false when the recorder could not be installed (for
/// example because another recorder already owns the global slot).
pub fn init_metrics() -> bool {
    if HANDLE.get().is_some() {
        return true;
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = HANDLE.set(handle);
            registry::register_all_metrics();
            info!("Prometheus recorder installed");
            true
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
            false
        }
    }
}

/// Render the current metric values in Prometheus text format
pub fn render() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

/// Trait for phase-specific metrics collections
pub trait PhaseMetrics {
    /// Register all metrics for this phase
    fn register_metrics();

    /// Phase name used as the metric name prefix
    fn phase_name() -> &'static str;

    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
    pub labels: Vec<&'static str>,
}

#[derive(Debug, Clone)]
pub enum MetricType {
    Counter,
    Histogram,
    Gauge,
}

/// Builds metric names following `jobs_{phase}_{name}[_total]`
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("jobs_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("jobs_", $phase, "_", $name)
    };
    (gauge, $phase:literal, $name:literal) => {
        concat!("jobs_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;

#[cfg(test)]
mod tests {
    #[test]
    fn test_metric_naming_convention() {
        assert_eq!(
            phase_metric!(counter, "ingest", "rows_read"),
            "jobs_ingest_rows_read_total"
        );
        assert_eq!(
            phase_metric!(histogram, "filter", "skills_per_record"),
            "jobs_filter_skills_per_record"
        );
        assert_eq!(
            phase_metric!(gauge, "filter", "records_emitted"),
            "jobs_filter_records_emitted"
        );
    }
}
