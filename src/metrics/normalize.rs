//! Normalize Phase Metrics
//!
//! Per-source adapter outcomes: candidates produced and rows skipped, plus
//! location lookups that fell back to `Remote`.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct NormalizeMetrics;

impl NormalizeMetrics {
    pub fn record_candidates(source_id: &str, count: usize) {
        ::metrics::counter!(phase_metric!(counter, "normalize", "candidates"), "source" => source_id.to_string())
            .increment(count as u64);
    }

    /// `reason` is one of the `SkipReason` labels
    pub fn record_skipped(source_id: &str, reason: &'static str, count: usize) {
        ::metrics::counter!(
            phase_metric!(counter, "normalize", "rows_skipped"),
            "source" => source_id.to_string(),
            "reason" => reason
        )
        .increment(count as u64);
    }

    pub fn record_location_fallbacks(source_id: &str, count: usize) {
        ::metrics::counter!(phase_metric!(counter, "normalize", "location_fallbacks"), "source" => source_id.to_string())
            .increment(count as u64);
    }
}

impl PhaseMetrics for NormalizeMetrics {
    fn register_metrics() {
        use metrics::counter;

        let _ = counter!(phase_metric!(counter, "normalize", "candidates"));
        let _ = counter!(phase_metric!(counter, "normalize", "rows_skipped"));
        let _ = counter!(phase_metric!(counter, "normalize", "location_fallbacks"));
    }

    fn phase_name() -> &'static str {
        "normalize"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "normalize", "candidates"),
                metric_type: MetricType::Counter,
                help: "Candidate records produced by source adapters",
                labels: vec!["source"],
            },
            MetricDoc {
                name: phase_metric!(counter, "normalize", "rows_skipped"),
                metric_type: MetricType::Counter,
                help: "Rows excluded by an adapter (unparseable salary, unrecognized title)",
                labels: vec!["source", "reason"],
            },
            MetricDoc {
                name: phase_metric!(counter, "normalize", "location_fallbacks"),
                metric_type: MetricType::Counter,
                help: "Location strings that matched no region and were reported as Remote",
                labels: vec!["source"],
            },
        ]
    }
}
