use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants;
use crate::error::{PipelineError, Result};
use crate::pipeline::processing::adapters::normalize_key;
use crate::pipeline::processing::salary::{DEFAULT_ANNUAL_HOURS, DEFAULT_HOURLY_THRESHOLD};
use crate::pipeline::processing::skills::{DEFAULT_DENYLIST, DEFAULT_EXCLUSION_PATTERNS};
use crate::types::JobTitle;

/// Run configuration, loaded once and passed by reference to every component
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input sources, in the order their records are emitted
    pub sources: Vec<SourceConfig>,
    pub salary: SalaryConfig,
    pub skills: SkillsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub kind: String,
    pub path: PathBuf,
    /// When false, records from this source are emitted even with no skills
    #[serde(default = "default_true")]
    pub require_skills: bool,
    /// Extra title remappings, keyed by the source's raw title (case-insensitive)
    #[serde(default)]
    pub titles: HashMap<String, JobTitle>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SalaryConfig {
    /// Unit-less values below this are read as hourly rates
    pub hourly_threshold: f64,
    /// Work hours per year used to annualize hourly rates
    pub annual_hours: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SkillsConfig {
    pub exclusion_patterns: Vec<String>,
    pub denylist: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub summary: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: vec![
                SourceConfig {
                    name: constants::QUALIFICATIONS_SOURCE.to_string(),
                    kind: constants::QUALIFICATIONS_KIND.to_string(),
                    path: PathBuf::from(constants::QUALIFICATIONS_DEFAULT_PATH),
                    require_skills: true,
                    titles: HashMap::new(),
                },
                SourceConfig {
                    name: constants::FLEXJOBS_SOURCE.to_string(),
                    kind: constants::FLEXJOBS_KIND.to_string(),
                    path: PathBuf::from(constants::FLEXJOBS_DEFAULT_PATH),
                    require_skills: true,
                    titles: HashMap::new(),
                },
            ],
            salary: SalaryConfig::default(),
            skills: SkillsConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for SalaryConfig {
    fn default() -> Self {
        Self {
            hourly_threshold: DEFAULT_HOURLY_THRESHOLD,
            annual_hours: DEFAULT_ANNUAL_HOURS,
        }
    }
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            exclusion_patterns: DEFAULT_EXCLUSION_PATTERNS.iter().map(|p| p.to_string()).collect(),
            denylist: DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(constants::DEFAULT_OUTPUT_PATH),
            summary: None,
        }
    }
}

impl SourceConfig {
    /// Title keys that collapse to the same lookup key must agree, otherwise
    /// the winner would depend on map iteration order
    fn validate_titles(&self) -> Result<()> {
        let mut keys: HashMap<String, (&str, JobTitle)> = HashMap::new();
        for (raw, title) in &self.titles {
            let key = normalize_key(raw);
            if let Some((other, other_title)) = keys.get(&key) {
                if *other_title != *title {
                    return Err(PipelineError::Config(format!(
                        "source '{}' maps '{}' and '{}' to different titles",
                        self.name, other, raw
                    )));
                }
            }
            keys.insert(key, (raw.as_str(), *title));
        }
        Ok(())
    }
}

impl Config {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), sources = config.sources.len(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config file: explicit path, then `JOB_CANON_CONFIG`, then
    /// `job_canon.toml` in the working directory. Built-in defaults apply when
    /// no file is found through the implicit lookups.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Ok(path) = std::env::var(constants::CONFIG_PATH_ENV) {
            if !path.trim().is_empty() {
                return Self::load(Path::new(path.trim()));
            }
        }
        let default_path = Path::new(constants::DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            return Self::load(default_path);
        }
        debug!("No config file found, using built-in defaults");
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(PipelineError::Config("at least one source is required".to_string()));
        }
        let supported = constants::get_supported_kinds();
        let mut seen = std::collections::HashSet::new();
        for source in &self.sources {
            if !supported.contains(&source.kind.as_str()) {
                return Err(PipelineError::UnknownSource(source.kind.clone()));
            }
            if !seen.insert(source.name.as_str()) {
                return Err(PipelineError::Config(format!(
                    "duplicate source name '{}'",
                    source.name
                )));
            }
            source.validate_titles()?;
        }
        let threshold = self.salary.hourly_threshold;
        let hours = self.salary.annual_hours;
        if threshold.is_nan() || threshold < 0.0 || hours.is_nan() || hours <= 0.0 {
            return Err(PipelineError::Config(
                "salary.hourly_threshold must be >= 0 and salary.annual_hours > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_both_sources_in_order() {
        let config = Config::default();
        let kinds: Vec<&str> = config.sources.iter().map(|s| s.kind.as_str()).collect();
        assert_eq!(kinds, vec![constants::QUALIFICATIONS_KIND, constants::FLEXJOBS_KIND]);
        assert_eq!(config.salary.hourly_threshold, 250.0);
        assert_eq!(config.salary.annual_hours, 2000.0);
        assert!(config.skills.denylist.iter().any(|s| s == "leadership"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml_with_titles() {
        let config = Config::from_toml_str(
            r#"
            [[sources]]
            name = "board"
            kind = "flexjobs"
            path = "board.csv"
            require_skills = false

            [sources.titles]
            "ml engineer" = "AI/ML"

            [salary]
            hourly_threshold = 100.0

            [output]
            path = "out.csv"
            summary = "summary.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.sources.len(), 1);
        let source = &config.sources[0];
        assert!(!source.require_skills);
        assert_eq!(source.titles.get("ml engineer"), Some(&JobTitle::AiMl));
        assert_eq!(config.salary.hourly_threshold, 100.0);
        assert_eq!(config.salary.annual_hours, 2000.0);
        assert_eq!(config.output.summary, Some(PathBuf::from("summary.json")));
        // untouched sections keep their defaults
        assert!(!config.skills.exclusion_patterns.is_empty());
    }

    #[test]
    fn test_conflicting_title_keys_rejected() {
        let err = Config::from_toml_str(
            r#"
            [[sources]]
            name = "board"
            kind = "flexjobs"
            path = "board.csv"

            [sources.titles]
            "ML Engineer" = "AI/ML"
            "ml  engineer" = "Data Scientist"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Config(msg) if msg.contains("different titles")));
    }

    #[test]
    fn test_equivalent_title_keys_that_agree_are_accepted() {
        let config = Config::from_toml_str(
            r#"
            [[sources]]
            name = "board"
            kind = "flexjobs"
            path = "board.csv"

            [sources.titles]
            "ML Engineer" = "AI/ML"
            "ml engineer" = "AI/ML"
            "#,
        )
        .unwrap();
        assert_eq!(config.sources[0].titles.len(), 2);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = Config::from_toml_str(
            r#"
            [[sources]]
            name = "x"
            kind = "indeed"
            path = "x.csv"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::UnknownSource(kind) if kind == "indeed"));
    }

    #[test]
    fn test_duplicate_source_names_rejected() {
        let err = Config::from_toml_str(
            r#"
            [[sources]]
            name = "x"
            kind = "flexjobs"
            path = "a.csv"

            [[sources]]
            name = "x"
            kind = "qualifications"
            path = "b.csv"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
