use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The three job categories a canonical record may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JobTitle {
    #[serde(rename = "Software Engineering")]
    SoftwareEngineering,
    #[serde(rename = "Data Scientist")]
    DataScientist,
    #[serde(rename = "AI/ML")]
    AiMl,
}

impl JobTitle {
    pub const ALL: [JobTitle; 3] = [
        JobTitle::SoftwareEngineering,
        JobTitle::DataScientist,
        JobTitle::AiMl,
    ];

    /// Title assigned when a source row carries no title at all
    pub const DEFAULT: JobTitle = JobTitle::SoftwareEngineering;

    pub fn label(&self) -> &'static str {
        match self {
            JobTitle::SoftwareEngineering => "Software Engineering",
            JobTitle::DataScientist => "Data Scientist",
            JobTitle::AiMl => "AI/ML",
        }
    }

    /// Parse a canonical label, ignoring case and surrounding whitespace
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|title| title.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for JobTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalized location: a two-letter region code or remote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    State(&'static str),
    Remote,
}

impl Location {
    pub fn code(&self) -> &'static str {
        match self {
            Location::State(abbr) => *abbr,
            Location::Remote => "Remote",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A record produced by a source adapter, before skill canonicalization
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    pub source_id: String,
    pub title: JobTitle,
    pub location: Location,
    /// Raw qualification text; `None` when the source has none for this row
    pub raw_skills: Option<String>,
    pub salary: f64,
    /// Whether this record must end up with at least one skill to be emitted
    pub require_skills: bool,
}

/// A fully normalized job posting
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    pub title: JobTitle,
    pub location: Location,
    pub skills: BTreeSet<String>,
    pub salary: f64,
}

impl CanonicalRecord {
    pub fn skills_joined(&self) -> String {
        self.skills
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(crate::constants::SKILL_JOINER)
    }

    pub fn salary_formatted(&self) -> String {
        format!("{:.2}", self.salary)
    }
}
