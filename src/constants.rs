/// Source kind constants shared by the config layer and the adapter registry.

// Source kinds (the `kind` key of a `[[sources]]` entry)
pub const QUALIFICATIONS_KIND: &str = "qualifications";
pub const FLEXJOBS_KIND: &str = "flexjobs";

// Default source names and input files
pub const QUALIFICATIONS_SOURCE: &str = "simplyjobs";
pub const FLEXJOBS_SOURCE: &str = "flexjobs";
pub const QUALIFICATIONS_DEFAULT_PATH: &str = "processed_job_data.csv";
pub const FLEXJOBS_DEFAULT_PATH: &str = "flexjobs_jobs.csv";

pub const DEFAULT_OUTPUT_PATH: &str = "filtered_data.csv";
pub const DEFAULT_CONFIG_PATH: &str = "job_canon.toml";
pub const CONFIG_PATH_ENV: &str = "JOB_CANON_CONFIG";

/// Placeholder written by the collectors when a page element was missing.
pub const MISSING_FIELD_PLACEHOLDER: &str = "N/A";

/// Canonical output header, in column order.
pub const OUTPUT_COLUMNS: [&str; 4] = ["Title", "Location", "Skills", "Salary"];

/// Separator used when joining canonical skills into one cell.
pub const SKILL_JOINER: &str = "; ";

/// Get all supported source kinds
pub fn get_supported_kinds() -> Vec<&'static str> {
    vec![QUALIFICATIONS_KIND, FLEXJOBS_KIND]
}
