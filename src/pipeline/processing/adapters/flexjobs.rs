use serde::Deserialize;
use std::io::Read;
use std::sync::Arc;

use super::base::{AdapterContext, RawFields};
use super::{AdapterOutcome, SourceAdapter, TitleMap};
use crate::error::Result;
use crate::pipeline::ingestion::{field, ingest_csv, SourceBatch};
use crate::types::JobTitle;

/// Row shape of the FlexJobs search-results export
#[derive(Debug, Clone, Deserialize)]
pub struct FlexJobsRow {
    /// Search category the posting was collected under
    #[serde(rename = "Job Title")]
    pub job_title: String,
    #[serde(rename = "Job Name")]
    pub job_name: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Remote Option")]
    pub remote_option: String,
    #[serde(rename = "Salary Range")]
    pub salary_range: String,
}

/// Adapter for FlexJobs listings.
///
/// The title comes from the search category rather than the posting name, the
/// remote option stands in for location, and there are no qualifications, so
/// every candidate carries no skill text.
pub struct FlexJobsAdapter {
    source_id: String,
    titles: TitleMap,
    require_skills: bool,
    context: Arc<AdapterContext>,
}

impl FlexJobsAdapter {
    pub const REQUIRED_COLUMNS: &'static [&'static str] =
        &["Job Title", "Job Name", "Description", "Remote Option", "Salary Range"];

    pub fn new(source_id: impl Into<String>, context: Arc<AdapterContext>) -> Self {
        Self {
            source_id: source_id.into(),
            titles: Self::default_titles(),
            require_skills: true,
            context,
        }
    }

    /// Search categories used by the collector, plus the canonical labels
    pub fn default_titles() -> TitleMap {
        let mut titles = TitleMap::canonical();
        titles.insert("software engineer", JobTitle::SoftwareEngineering);
        titles.insert("machine learning engineer", JobTitle::AiMl);
        titles
    }

    pub fn with_titles(mut self, titles: TitleMap) -> Self {
        self.titles = titles;
        self
    }

    pub fn with_require_skills(mut self, require_skills: bool) -> Self {
        self.require_skills = require_skills;
        self
    }

    pub fn adapt(&self, row: &FlexJobsRow) -> AdapterOutcome {
        self.context.build_candidate(
            &self.source_id,
            &self.titles,
            self.require_skills,
            RawFields {
                title: field(&row.job_title),
                location: field(&row.remote_option),
                salary: field(&row.salary_range),
                skills: None,
            },
        )
    }
}

impl SourceAdapter for FlexJobsAdapter {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn name(&self) -> &str {
        "FlexJobs Adapter"
    }

    fn ingest(&self, reader: &mut dyn Read) -> Result<SourceBatch> {
        ingest_csv::<FlexJobsRow, _>(&self.source_id, reader, Self::REQUIRED_COLUMNS, |row| {
            self.adapt(row)
        })
    }
}
