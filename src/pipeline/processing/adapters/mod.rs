// Shared adapter context and the metrics wrapper
pub mod base;

// Per-source adapters
pub mod flexjobs;
pub mod qualifications;

pub mod registry;

use std::collections::HashMap;
use std::io::Read;

use crate::error::Result;
use crate::pipeline::ingestion::SourceBatch;
use crate::types::{CandidateRecord, JobTitle};

pub use base::{AdapterContext, MetricsAdapter, RawFields};
pub use flexjobs::{FlexJobsAdapter, FlexJobsRow};
pub use qualifications::{QualificationsAdapter, QualificationsRow};
pub use registry::AdapterRegistry;

/// Maps one source's raw row shape onto candidate records
pub trait SourceAdapter: Send + Sync {
    /// Configured name of the source this adapter reads
    fn source_id(&self) -> &str;

    /// Human-readable adapter name
    fn name(&self) -> &str;

    /// Read the whole source and adapt every row, in file order
    fn ingest(&self, reader: &mut dyn Read) -> Result<SourceBatch>;
}

/// Why an adapter excluded a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnparseableSalary,
    UnrecognizedTitle(String),
}

impl SkipReason {
    pub const SALARY_LABEL: &'static str = "unparseable_salary";
    pub const TITLE_LABEL: &'static str = "unrecognized_title";

    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::UnparseableSalary => Self::SALARY_LABEL,
            SkipReason::UnrecognizedTitle(_) => Self::TITLE_LABEL,
        }
    }
}

/// Result of adapting a single raw row
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterOutcome {
    Candidate {
        record: CandidateRecord,
        /// The location matched no region and was reported as remote
        location_fallback: bool,
    },
    Skipped(SkipReason),
}

/// Case-insensitive mapping from a source's raw titles to job categories
#[derive(Debug, Clone, Default)]
pub struct TitleMap {
    entries: HashMap<String, JobTitle>,
}

impl TitleMap {
    /// Every canonical label maps to itself
    pub fn canonical() -> Self {
        let mut map = Self::default();
        for title in JobTitle::ALL {
            map.insert(title.label(), title);
        }
        map
    }

    pub fn insert(&mut self, raw: &str, title: JobTitle) {
        self.entries.insert(normalize_key(raw), title);
    }

    pub fn with_overrides(mut self, overrides: &HashMap<String, JobTitle>) -> Self {
        for (raw, title) in overrides {
            self.insert(raw, *title);
        }
        self
    }

    /// Absent titles take the default category; unknown ones yield `None`
    pub fn resolve(&self, raw: Option<&str>) -> Option<JobTitle> {
        match raw {
            None => Some(JobTitle::DEFAULT),
            Some(raw) => self.entries.get(&normalize_key(raw)).copied(),
        }
    }
}

/// Lookup key for a raw title: lowercased, whitespace runs collapsed
pub fn normalize_key(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
