use serde::Deserialize;
use std::io::Read;
use std::sync::Arc;

use super::base::{AdapterContext, RawFields};
use super::{AdapterOutcome, SourceAdapter, TitleMap};
use crate::error::Result;
use crate::pipeline::ingestion::{field, ingest_csv, SourceBatch};

/// Row shape of the qualifications-bearing job board export
#[derive(Debug, Clone, Deserialize)]
pub struct QualificationsRow {
    #[serde(rename = "Job Name")]
    pub job_name: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Salary")]
    pub salary: String,
    #[serde(rename = "Qualifications")]
    pub qualifications: String,
}

/// Adapter for sources that list job name, location, salary and a
/// semicolon-joined qualifications string
pub struct QualificationsAdapter {
    source_id: String,
    titles: TitleMap,
    require_skills: bool,
    context: Arc<AdapterContext>,
}

impl QualificationsAdapter {
    pub const REQUIRED_COLUMNS: &'static [&'static str] =
        &["Job Name", "Location", "Salary", "Qualifications"];

    pub fn new(source_id: impl Into<String>, context: Arc<AdapterContext>) -> Self {
        Self {
            source_id: source_id.into(),
            titles: Self::default_titles(),
            require_skills: true,
            context,
        }
    }

    /// Job names on this board already use the canonical categories
    pub fn default_titles() -> TitleMap {
        TitleMap::canonical()
    }

    pub fn with_titles(mut self, titles: TitleMap) -> Self {
        self.titles = titles;
        self
    }

    pub fn with_require_skills(mut self, require_skills: bool) -> Self {
        self.require_skills = require_skills;
        self
    }

    pub fn adapt(&self, row: &QualificationsRow) -> AdapterOutcome {
        self.context.build_candidate(
            &self.source_id,
            &self.titles,
            self.require_skills,
            RawFields {
                title: field(&row.job_name),
                location: field(&row.location),
                salary: field(&row.salary),
                skills: field(&row.qualifications),
            },
        )
    }
}

impl SourceAdapter for QualificationsAdapter {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn name(&self) -> &str {
        "Qualifications Board Adapter"
    }

    fn ingest(&self, reader: &mut dyn Read) -> Result<SourceBatch> {
        ingest_csv::<QualificationsRow, _>(&self.source_id, reader, Self::REQUIRED_COLUMNS, |row| {
            self.adapt(row)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::types::{JobTitle, Location};

    fn adapter() -> QualificationsAdapter {
        QualificationsAdapter::new("simplyjobs", Arc::new(AdapterContext::default()))
    }

    #[test]
    fn test_ingest_preserves_file_order_and_counts() {
        let csv = "\
Job Name,Location,Salary,Qualifications
Data Scientist,\"Austin, TX\",\"$120,000\",Python; SQL; 3+ years
Barista,\"Seattle, WA\",$40000,Coffee
Software Engineering,Remote,N/A,Rust
AI/ML,\"Boston, Massachusetts\",45.9K,N/A
";
        let batch = adapter().ingest(&mut csv.as_bytes()).unwrap();

        assert_eq!(batch.stats.rows_read, 4);
        assert_eq!(batch.stats.unrecognized_title, 1);
        assert_eq!(batch.stats.unparseable_salary, 1);
        assert_eq!(batch.stats.candidates, 2);
        assert_eq!(batch.candidates.len(), 2);

        let first = &batch.candidates[0];
        assert_eq!(first.title, JobTitle::DataScientist);
        assert_eq!(first.location, Location::State("TX"));
        assert_eq!(first.salary, 120000.0);
        assert_eq!(first.raw_skills.as_deref(), Some("Python; SQL; 3+ years"));

        let second = &batch.candidates[1];
        assert_eq!(second.title, JobTitle::AiMl);
        assert_eq!(second.location, Location::State("MA"));
        assert_eq!(second.salary, 45900.0);
        assert_eq!(second.raw_skills, None);
    }

    #[test]
    fn test_missing_job_name_defaults_to_software_engineering() {
        let csv = "Job Name,Location,Salary,Qualifications\n,Remote,$90000,Go\n";
        let batch = adapter().ingest(&mut csv.as_bytes()).unwrap();
        assert_eq!(batch.candidates[0].title, JobTitle::SoftwareEngineering);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let csv = "Job Name,Location,Salary\nData Scientist,Remote,$90000\n";
        let err = adapter().ingest(&mut csv.as_bytes()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingField { ref field, .. } if field == "Qualifications"));
    }

    #[test]
    fn test_malformed_row_is_quarantined() {
        let csv = "\
Job Name,Location,Salary,Qualifications
Data Scientist,Remote
Data Scientist,Remote,$90000,SQL
";
        let batch = adapter().ingest(&mut csv.as_bytes()).unwrap();
        assert_eq!(batch.stats.rows_read, 2);
        assert_eq!(batch.stats.quarantined, 1);
        assert_eq!(batch.candidates.len(), 1);
    }
}
