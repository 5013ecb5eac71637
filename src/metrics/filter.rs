//! Filter Phase Metrics
//!
//! The final denylist pass: records dropped for having no skills and records
//! written to the canonical dataset.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct FilterMetrics;

impl FilterMetrics {
    pub fn record_pass(emitted: usize, dropped_empty_skills: usize) {
        ::metrics::counter!(phase_metric!(counter, "filter", "records_emitted")).increment(emitted as u64);
        ::metrics::counter!(phase_metric!(counter, "filter", "records_dropped_empty_skills"))
            .increment(dropped_empty_skills as u64);
        ::metrics::gauge!(phase_metric!(gauge, "filter", "last_run_records")).set(emitted as f64);
    }

    pub fn record_skills_per_record(count: usize) {
        ::metrics::histogram!(phase_metric!(histogram, "filter", "skills_per_record")).record(count as f64);
    }
}

impl PhaseMetrics for FilterMetrics {
    fn register_metrics() {
        use metrics::{counter, gauge, histogram};

        let _ = counter!(phase_metric!(counter, "filter", "records_emitted"));
        let _ = counter!(phase_metric!(counter, "filter", "records_dropped_empty_skills"));
        let _ = gauge!(phase_metric!(gauge, "filter", "last_run_records"));
        let _ = histogram!(phase_metric!(histogram, "filter", "skills_per_record"));
    }

    fn phase_name() -> &'static str {
        "filter"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "filter", "records_emitted"),
                metric_type: MetricType::Counter,
                help: "Canonical records written to the output dataset",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "filter", "records_dropped_empty_skills"),
                metric_type: MetricType::Counter,
                help: "Records removed because no skill survived filtering",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(gauge, "filter", "last_run_records"),
                metric_type: MetricType::Gauge,
                help: "Size of the most recently emitted dataset",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(histogram, "filter", "skills_per_record"),
                metric_type: MetricType::Histogram,
                help: "Number of canonical skills on each emitted record",
                labels: vec![],
            },
        ]
    }
}
