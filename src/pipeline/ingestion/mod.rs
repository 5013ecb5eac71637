//! Typed CSV boundary for raw source files
//!
//! Headers are validated up front; each row is deserialized into the source's
//! row struct. Rows that do not fit the shape are quarantined and counted, not
//! propagated.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Read;
use tracing::{debug, warn};

use crate::constants::MISSING_FIELD_PLACEHOLDER;
use crate::error::{PipelineError, Result};
use crate::pipeline::processing::adapters::{AdapterOutcome, SkipReason};
use crate::types::CandidateRecord;

/// Per-source counts for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    pub source_id: String,
    pub rows_read: usize,
    pub quarantined: usize,
    pub unparseable_salary: usize,
    pub unrecognized_title: usize,
    pub location_fallbacks: usize,
    pub candidates: usize,
}

impl SourceStats {
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            ..Self::default()
        }
    }

    pub fn skipped(&self) -> usize {
        self.unparseable_salary + self.unrecognized_title
    }

    fn record_skip(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::UnparseableSalary => self.unparseable_salary += 1,
            SkipReason::UnrecognizedTitle(_) => self.unrecognized_title += 1,
        }
    }
}

/// Candidates from one source, in file order
#[derive(Debug, Clone, Default)]
pub struct SourceBatch {
    pub candidates: Vec<CandidateRecord>,
    pub stats: SourceStats,
}

/// Returns the trimmed field value, or `None` when blank or the collector's `N/A` placeholder
pub fn field(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(MISSING_FIELD_PLACEHOLDER) {
        None
    } else {
        Some(trimmed)
    }
}

/// Fails when any required column is absent from the header row
pub fn check_headers(source_id: &str, headers: &csv::StringRecord, required: &[&str]) -> Result<()> {
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(PipelineError::MissingField {
                source_id: source_id.to_string(),
                field: (*column).to_string(),
            });
        }
    }
    Ok(())
}

/// Read a CSV source into typed rows and adapt each one, preserving file order.
///
/// Header problems and I/O failures abort; malformed rows are quarantined.
pub fn ingest_csv<T, F>(
    source_id: &str,
    reader: &mut dyn Read,
    required: &[&str],
    mut adapt: F,
) -> Result<SourceBatch>
where
    T: DeserializeOwned,
    F: FnMut(&T) -> AdapterOutcome,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    check_headers(source_id, &headers, required)?;

    let mut batch = SourceBatch {
        candidates: Vec::new(),
        stats: SourceStats::new(source_id),
    };

    for (index, result) in csv_reader.deserialize::<T>().enumerate() {
        batch.stats.rows_read += 1;
        let row = match result {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                warn!(source = source_id, row = index + 1, "Quarantined malformed row: {}", e);
                batch.stats.quarantined += 1;
                continue;
            }
        };

        match adapt(&row) {
            AdapterOutcome::Candidate { record, location_fallback } => {
                if location_fallback {
                    batch.stats.location_fallbacks += 1;
                }
                batch.stats.candidates += 1;
                batch.candidates.push(record);
            }
            AdapterOutcome::Skipped(reason) => {
                debug!(source = source_id, row = index + 1, reason = reason.label(), "Skipped row");
                batch.stats.record_skip(&reason);
            }
        }
    }

    Ok(batch)
}
