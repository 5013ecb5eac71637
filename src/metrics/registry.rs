//! Registers every phase's metrics and flags naming conflicts early.

use crate::metrics::{MetricDoc, PhaseMetrics};
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub fn register_all_metrics() {
    let mut all_metrics = HashMap::new();

    register_phase_metrics::<super::ingest::IngestMetrics>(&mut all_metrics);
    register_phase_metrics::<super::normalize::NormalizeMetrics>(&mut all_metrics);
    register_phase_metrics::<super::filter::FilterMetrics>(&mut all_metrics);

    info!(
        "Registered {} total metrics across all phases",
        all_metrics.len()
    );
}

fn register_phase_metrics<T: PhaseMetrics>(all_metrics: &mut HashMap<String, MetricDoc>) {
    T::register_metrics();
    let phase_name = T::phase_name();

    for doc in T::metrics_documentation() {
        let doc_phase = extract_phase_from_metric_name(doc.name);
        if doc_phase != phase_name {
            warn!(
                "Metric '{}' is documented under phase '{}' but named for '{}'",
                doc.name, phase_name, doc_phase
            );
        }
        if all_metrics.contains_key(doc.name) {
            warn!("Metric name conflict detected: '{}' (phase '{}')", doc.name, phase_name);
        } else {
            debug!(metric = doc.name, kind = ?doc.metric_type, labels = ?doc.labels, "{}", doc.help);
            all_metrics.insert(doc.name.to_string(), doc);
        }
    }
}

/// Extract phase name from metric name (e.g., "jobs_ingest_rows_read_total" -> "ingest")
fn extract_phase_from_metric_name(metric_name: &str) -> &str {
    if let Some(stripped) = metric_name.strip_prefix("jobs_") {
        if let Some(next_underscore) = stripped.find('_') {
            return &stripped[..next_underscore];
        }
    }
    "unknown"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_phase_from_metric_name() {
        assert_eq!(
            extract_phase_from_metric_name("jobs_ingest_rows_read_total"),
            "ingest"
        );
        assert_eq!(
            extract_phase_from_metric_name("jobs_filter_skills_per_record"),
            "filter"
        );
        assert_eq!(
            extract_phase_from_metric_name("invalid_metric_name"),
            "unknown"
        );
    }

    #[test]
    fn test_register_all_metrics_runs_without_recorder() {
        register_all_metrics();
    }
}
