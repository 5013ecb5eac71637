pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod storage;
pub mod types;

pub use config::Config;
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineResult, RunSummary};
pub use storage::{CsvFileSink, DatasetSink, MemorySink};
pub use types::{CanonicalRecord, JobTitle, Location};
