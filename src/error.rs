use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("Failed to persist output file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Failed to open source file '{path}': {source}")]
    SourceFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source '{source_id}' is missing required field: {field}")]
    MissingField { source_id: String, field: String },

    #[error("Unknown source kind: {0}")]
    UnknownSource(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
