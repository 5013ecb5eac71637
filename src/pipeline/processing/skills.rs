use regex::Regex;
use std::collections::{BTreeSet, HashSet};

use crate::config::SkillsConfig;
use crate::error::Result;

/// Experience and education phrases stripped from qualification text before splitting
pub const DEFAULT_EXCLUSION_PATTERNS: &[&str] = &[
    r"\d+\+? years",
    r"level",
    r"entry",
    r"mid-level",
    r"senior",
    r"under \d+ year",
    r"\b(?:bachelor|master|ph\.d|degree|diploma)\b",
    r"\b(?:license|certification)\b",
    r"program management",
    r"windows",
    r"microsoft office",
    r"powerpoint",
];

/// Exact tokens that are never treated as skills
pub const DEFAULT_DENYLIST: &[&str] = &[
    "'s",
    "of science",
    "doctoral",
    "doctor of philosophy",
    "1 year",
    "of business administration",
    "bachelor",
    "master",
    "ph.d",
    "degree",
    "diploma",
    "license",
    "certification",
    "microsoft office",
    "powerpoint",
    "windows",
    "leadership",
    "associate's",
    "mentoring",
    "teaching",
    "product management",
    "microsoft",
    "microsoft word",
    "powershell",
    "driver's",
    "snowflake",
    "pki",
    "journalism",
    "transcription",
    "grammar experience",
    "high school  or ged",
    "copywriting",
];

/// Turns semicolon-delimited qualification text into a clean set of skill tokens
#[derive(Debug, Clone)]
pub struct SkillCanonicalizer {
    /// All exclusion patterns folded into one case-insensitive alternation
    exclusion: Option<Regex>,
    denylist: HashSet<String>,
}

impl SkillCanonicalizer {
    pub fn new(config: &SkillsConfig) -> Result<Self> {
        Self::from_parts(&config.exclusion_patterns, &config.denylist)
    }

    pub fn from_parts<P, D>(patterns: &[P], denylist: &[D]) -> Result<Self>
    where
        P: AsRef<str>,
        D: AsRef<str>,
    {
        let exclusion = if patterns.is_empty() {
            None
        } else {
            let joined = patterns
                .iter()
                .map(|p| format!("(?:{})", p.as_ref()))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!("(?i){joined}"))?)
        };

        let denylist = denylist
            .iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self { exclusion, denylist })
    }

    /// Stage one: strip noise phrases, split on `;`, trim, lowercase, drop blanks.
    /// Duplicates are kept.
    pub fn tokenize(&self, raw: &str) -> Vec<String> {
        let cleaned = match &self.exclusion {
            Some(pattern) => pattern.replace_all(raw, ""),
            None => raw.into(),
        };
        cleaned
            .split(';')
            .map(|token| token.trim().to_lowercase())
            .filter(|token| !token.is_empty())
            .collect()
    }

    /// Stage two: collapse duplicates and remove denylisted tokens
    pub fn filter<I>(&self, tokens: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = String>,
    {
        tokens
            .into_iter()
            .map(|token| token.trim().to_lowercase())
            .filter(|token| !token.is_empty() && !self.is_denied(token))
            .collect()
    }

    /// Both stages. Absent text yields an empty set.
    pub fn canonicalize(&self, raw: Option<&str>) -> BTreeSet<String> {
        match raw {
            Some(text) => self.filter(self.tokenize(text)),
            None => BTreeSet::new(),
        }
    }

    pub fn is_denied(&self, token: &str) -> bool {
        self.denylist.contains(token)
    }
}

impl Default for SkillCanonicalizer {
    fn default() -> Self {
        Self::from_parts(DEFAULT_EXCLUSION_PATTERNS, DEFAULT_DENYLIST)
            .expect("built-in exclusion patterns are valid")
    }
}
