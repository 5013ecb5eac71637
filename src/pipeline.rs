//! Batch orchestration: ingest every configured source, then run the final
//! skill pass over the concatenated candidates.

pub mod ingestion;
pub mod processing;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::metrics::filter::FilterMetrics;
use crate::storage::{DatasetSink, WriteReport};
use crate::types::CanonicalRecord;
use ingestion::{SourceBatch, SourceStats};
use processing::adapters::AdapterRegistry;
use processing::skills::SkillCanonicalizer;
use processing::tally::SkillTally;

/// Result of a complete pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineResult {
    /// Emitted records, source-major in configuration order
    pub records: Vec<CanonicalRecord>,
    pub sources: Vec<SourceStats>,
    pub dropped_empty_skills: usize,
}

impl PipelineResult {
    pub fn rows_read(&self) -> usize {
        self.sources.iter().map(|s| s.rows_read).sum()
    }

    pub fn candidates(&self) -> usize {
        self.sources.iter().map(|s| s.candidates).sum()
    }

    pub fn tally(&self) -> SkillTally {
        SkillTally::from_records(&self.records)
    }
}

pub struct Pipeline {
    registry: AdapterRegistry,
    canonicalizer: SkillCanonicalizer,
}

impl Pipeline {
    pub fn new(registry: AdapterRegistry, canonicalizer: SkillCanonicalizer) -> Self {
        Self {
            registry,
            canonicalizer,
        }
    }

    /// Validate the configuration and build every adapter it names
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let canonicalizer = SkillCanonicalizer::new(&config.skills)?;
        let registry = AdapterRegistry::from_config(config)?;
        Ok(Self::new(registry, canonicalizer))
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Read every source file in order and merge the batches.
    ///
    /// A source file that cannot be opened, or that lacks a required column,
    /// aborts the run before anything is emitted.
    #[instrument(skip(self), fields(sources = self.registry.sources().len()))]
    pub fn run(&self) -> Result<PipelineResult> {
        let started = Instant::now();
        let mut batches = Vec::with_capacity(self.registry.sources().len());

        for source in self.registry.sources() {
            let file = File::open(&source.path).map_err(|e| PipelineError::SourceFile {
                path: source.path.display().to_string(),
                source: e,
            })?;
            let mut reader = BufReader::new(file);
            debug!(source = source.adapter.source_id(), path = %source.path.display(), "Reading source");
            batches.push(source.adapter.ingest(&mut reader)?);
        }

        let result = self.merge(batches);
        info!(
            rows_read = result.rows_read(),
            emitted = result.records.len(),
            dropped_empty_skills = result.dropped_empty_skills,
            duration_secs = started.elapsed().as_secs_f64(),
            "Pipeline finished"
        );
        Ok(result)
    }

    /// Concatenate batches source-major and apply the final skill pass.
    ///
    /// Records whose canonical skill set is empty are dropped unless their
    /// source opted out of requiring skills.
    pub fn merge(&self, batches: Vec<SourceBatch>) -> PipelineResult {
        let mut result = PipelineResult::default();

        for batch in batches {
            for candidate in batch.candidates {
                let skills = self.canonicalizer.canonicalize(candidate.raw_skills.as_deref());
                if skills.is_empty() && candidate.require_skills {
                    result.dropped_empty_skills += 1;
                    continue;
                }
                FilterMetrics::record_skills_per_record(skills.len());
                result.records.push(CanonicalRecord {
                    title: candidate.title,
                    location: candidate.location,
                    skills,
                    salary: candidate.salary,
                });
            }
            result.sources.push(batch.stats);
        }

        FilterMetrics::record_pass(result.records.len(), result.dropped_empty_skills);
        result
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: usize,
}

/// JSON run report written beside the canonical dataset
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub completed_at: DateTime<Utc>,
    pub output: WriteReport,
    pub sources: Vec<SourceStats>,
    pub rows_read: usize,
    pub candidates: usize,
    pub dropped_empty_skills: usize,
    pub emitted: usize,
    pub top_skills: Vec<SkillCount>,
}

impl RunSummary {
    pub fn new(result: &PipelineResult, output: WriteReport, top_skills: usize) -> Self {
        let top_skills = result
            .tally()
            .most_common(top_skills)
            .into_iter()
            .map(|(skill, count)| SkillCount { skill, count })
            .collect();
        Self {
            completed_at: Utc::now(),
            output,
            sources: result.sources.clone(),
            rows_read: result.rows_read(),
            candidates: result.candidates(),
            dropped_empty_skills: result.dropped_empty_skills,
            emitted: result.records.len(),
            top_skills,
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Run the pipeline and write its output through `sink`
pub fn run_into(pipeline: &Pipeline, sink: &mut dyn DatasetSink) -> Result<(PipelineResult, WriteReport)> {
    let result = pipeline.run()?;
    let report = sink.write(&result.records)?;
    info!(records = report.records, sha256 = %report.sha256, "Wrote canonical dataset");
    Ok((result, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CandidateRecord, JobTitle, Location};

    fn candidate(source: &str, title: JobTitle, skills: Option<&str>, require_skills: bool) -> CandidateRecord {
        CandidateRecord {
            source_id: source.to_string(),
            title,
            location: Location::Remote,
            raw_skills: skills.map(str::to_string),
            salary: 100000.0,
            require_skills,
        }
    }

    fn batch(source: &str, candidates: Vec<CandidateRecord>) -> SourceBatch {
        let mut stats = SourceStats::new(source);
        stats.rows_read = candidates.len();
        stats.candidates = candidates.len();
        SourceBatch { candidates, stats }
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(AdapterRegistry::new(), SkillCanonicalizer::default())
    }

    #[test]
    fn test_merge_is_source_major() {
        let a = batch(
            "a",
            vec![
                candidate("a", JobTitle::DataScientist, Some("a1"), true),
                candidate("a", JobTitle::DataScientist, Some("a2"), true),
            ],
        );
        let b = batch(
            "b",
            vec![
                candidate("b", JobTitle::AiMl, Some("b1"), true),
                candidate("b", JobTitle::AiMl, Some("b2"), true),
            ],
        );

        let result = pipeline().merge(vec![a, b]);
        let order: Vec<String> = result.records.iter().map(|r| r.skills_joined()).collect();
        assert_eq!(order, vec!["a1", "a2", "b1", "b2"]);
        assert_eq!(result.sources.len(), 2);
        assert_eq!(result.rows_read(), 4);
    }

    #[test]
    fn test_merge_drops_empty_skill_sets() {
        let result = pipeline().merge(vec![batch(
            "a",
            vec![
                candidate("a", JobTitle::DataScientist, Some("Python; SQL; 3+ years"), true),
                candidate("a", JobTitle::AiMl, None, true),
                candidate("a", JobTitle::AiMl, Some("Leadership; Mentoring"), true),
            ],
        )]);

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.dropped_empty_skills, 2);
        assert_eq!(result.records[0].skills_joined(), "python; sql");
    }

    #[test]
    fn test_merge_keeps_empty_skills_when_source_opts_out() {
        let result = pipeline().merge(vec![batch(
            "flexjobs",
            vec![candidate("flexjobs", JobTitle::AiMl, None, false)],
        )]);
        assert_eq!(result.records.len(), 1);
        assert!(result.records[0].skills.is_empty());
        assert_eq!(result.dropped_empty_skills, 0);
    }

    #[test]
    fn test_summary_counts_top_skills() {
        let result = pipeline().merge(vec![batch(
            "a",
            vec![
                candidate("a", JobTitle::DataScientist, Some("python; sql"), true),
                candidate("a", JobTitle::AiMl, Some("python"), true),
            ],
        )]);
        let report = WriteReport {
            path: None,
            records: 2,
            bytes: 0,
            sha256: String::new(),
        };
        let summary = RunSummary::new(&result, report, 1);
        assert_eq!(summary.emitted, 2);
        assert_eq!(
            summary.top_skills,
            vec![SkillCount {
                skill: "python".to_string(),
                count: 2
            }]
        );
    }
}
