use std::io::Read;
use std::time::Instant;
use tracing::{info, warn};

use super::{AdapterOutcome, SkipReason, SourceAdapter, TitleMap};
use crate::config::Config;
use crate::error::Result;
use crate::metrics::{IngestMetrics, NormalizeMetrics};
use crate::pipeline::ingestion::SourceBatch;
use crate::pipeline::processing::location::{LocationMatch, LocationNormalizer};
use crate::pipeline::processing::salary::SalaryParser;
use crate::types::CandidateRecord;

/// Raw text fields pulled out of a source row, already passed through
/// [`crate::pipeline::ingestion::field`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RawFields<'a> {
    pub title: Option<&'a str>,
    pub location: Option<&'a str>,
    pub salary: Option<&'a str>,
    pub skills: Option<&'a str>,
}

/// Read-only parsers shared by every adapter in a run
#[derive(Debug, Clone, Default)]
pub struct AdapterContext {
    pub salary: SalaryParser,
    pub locations: LocationNormalizer,
}

impl AdapterContext {
    pub fn new(config: &Config) -> Self {
        Self {
            salary: SalaryParser::new(&config.salary),
            locations: LocationNormalizer::default(),
        }
    }

    /// Build a candidate from raw fields: salary first, then title, then location
    pub fn build_candidate(
        &self,
        source_id: &str,
        titles: &TitleMap,
        require_skills: bool,
        fields: RawFields<'_>,
    ) -> AdapterOutcome {
        let salary = match fields.salary.and_then(|s| self.salary.parse(s)) {
            Some(salary) => salary,
            None => return AdapterOutcome::Skipped(SkipReason::UnparseableSalary),
        };

        let title = match titles.resolve(fields.title) {
            Some(title) => title,
            None => {
                return AdapterOutcome::Skipped(SkipReason::UnrecognizedTitle(
                    fields.title.unwrap_or_default().to_string(),
                ))
            }
        };

        let location_match = self.locations.resolve(fields.location);

        AdapterOutcome::Candidate {
            record: CandidateRecord {
                source_id: source_id.to_string(),
                title,
                location: location_match.location(),
                raw_skills: fields.skills.map(str::to_string),
                salary,
                require_skills,
            },
            location_fallback: location_match == LocationMatch::Unrecognized,
        }
    }
}

/// A wrapper that records metrics and a log line around any adapter
pub struct MetricsAdapter<A: SourceAdapter> {
    inner: A,
}

impl<A: SourceAdapter> MetricsAdapter<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

impl<A: SourceAdapter> SourceAdapter for MetricsAdapter<A> {
    fn source_id(&self) -> &str {
        self.inner.source_id()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn ingest(&self, reader: &mut dyn Read) -> Result<SourceBatch> {
        let start = Instant::now();
        let batch = self.inner.ingest(reader)?;
        let stats = &batch.stats;
        let source_id = self.inner.source_id();

        IngestMetrics::record_source_read(source_id, stats.rows_read, start.elapsed().as_secs_f64());
        IngestMetrics::record_rows_quarantined(source_id, stats.quarantined);
        NormalizeMetrics::record_candidates(source_id, stats.candidates);
        NormalizeMetrics::record_skipped(source_id, SkipReason::SALARY_LABEL, stats.unparseable_salary);
        NormalizeMetrics::record_skipped(source_id, SkipReason::TITLE_LABEL, stats.unrecognized_title);
        NormalizeMetrics::record_location_fallbacks(source_id, stats.location_fallbacks);

        if stats.location_fallbacks > 0 {
            warn!(
                source = source_id,
                count = stats.location_fallbacks,
                "Unrecognized locations reported as Remote"
            );
        }
        info!(
            source = source_id,
            adapter = self.inner.name(),
            rows = stats.rows_read,
            candidates = stats.candidates,
            skipped = stats.skipped(),
            quarantined = stats.quarantined,
            "Adapted source"
        );

        Ok(batch)
    }
}
