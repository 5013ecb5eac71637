//! Ingest Phase Metrics
//!
//! Rows read from each source file and rows quarantined at the typed boundary.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct IngestMetrics;

impl IngestMetrics {
    pub fn record_source_read(source_id: &str, rows: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "ingest", "sources_read"), "source" => source_id.to_string())
            .increment(1);
        ::metrics::counter!(phase_metric!(counter, "ingest", "rows_read"), "source" => source_id.to_string())
            .increment(rows as u64);
        ::metrics::histogram!(phase_metric!(histogram, "ingest", "duration_seconds"), "source" => source_id.to_string())
            .record(duration_secs);
    }

    pub fn record_rows_quarantined(source_id: &str, count: usize) {
        ::metrics::counter!(phase_metric!(counter, "ingest", "rows_quarantined"), "source" => source_id.to_string())
            .increment(count as u64);
    }
}

impl PhaseMetrics for IngestMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "ingest", "sources_read"));
        let _ = counter!(phase_metric!(counter, "ingest", "rows_read"));
        let _ = counter!(phase_metric!(counter, "ingest", "rows_quarantined"));
        let _ = histogram!(phase_metric!(histogram, "ingest", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "ingest"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "ingest", "sources_read"),
                metric_type: MetricType::Counter,
                help: "Total number of source files read",
                labels: vec!["source"],
            },
            MetricDoc {
                name: phase_metric!(counter, "ingest", "rows_read"),
                metric_type: MetricType::Counter,
                help: "Total number of raw rows read from source files",
                labels: vec!["source"],
            },
            MetricDoc {
                name: phase_metric!(counter, "ingest", "rows_quarantined"),
                metric_type: MetricType::Counter,
                help: "Rows that did not match the source's expected shape",
                labels: vec!["source"],
            },
            MetricDoc {
                name: phase_metric!(histogram, "ingest", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Time spent reading and adapting one source file",
                labels: vec!["source"],
            },
        ]
    }
}
