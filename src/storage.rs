use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::constants::OUTPUT_COLUMNS;
use crate::error::{PipelineError, Result};
use crate::pipeline::processing::location::RegionTable;
use crate::types::{CanonicalRecord, JobTitle, Location};

/// What a sink wrote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteReport {
    pub path: Option<String>,
    pub records: usize,
    pub bytes: usize,
    /// Hex SHA-256 of the written bytes
    pub sha256: String,
}

/// Destination for the canonical dataset
pub trait DatasetSink {
    fn write(&mut self, records: &[CanonicalRecord]) -> Result<WriteReport>;
}

/// Render records as `Title,Location,Skills,Salary` CSV
pub fn encode_csv(records: &[CanonicalRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(OUTPUT_COLUMNS)?;
    for record in records {
        writer.write_record([
            record.title.label(),
            record.location.code(),
            record.skills_joined().as_str(),
            record.salary_formatted().as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| PipelineError::Io(e.into_error()))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Writes the dataset to a CSV file, replacing it atomically
pub struct CsvFileSink {
    path: PathBuf,
}

impl CsvFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DatasetSink for CsvFileSink {
    fn write(&mut self, records: &[CanonicalRecord]) -> Result<WriteReport> {
        let bytes = encode_csv(records)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        // Write beside the target and rename so readers never see a partial file
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "Wrote canonical dataset");

        Ok(WriteReport {
            path: Some(self.path.to_string_lossy().to_string()),
            records: records.len(),
            bytes: bytes.len(),
            sha256: sha256_hex(&bytes),
        })
    }
}

/// In-memory sink for tests and dry runs
#[derive(Debug, Default)]
pub struct MemorySink {
    pub buffer: Vec<u8>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.buffer).unwrap_or_default()
    }
}

impl DatasetSink for MemorySink {
    fn write(&mut self, records: &[CanonicalRecord]) -> Result<WriteReport> {
        self.buffer = encode_csv(records)?;
        Ok(WriteReport {
            path: None,
            records: records.len(),
            bytes: self.buffer.len(),
            sha256: sha256_hex(&self.buffer),
        })
    }
}

#[derive(Debug, Deserialize)]
struct DatasetRow {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "Skills")]
    skills: String,
    #[serde(rename = "Salary")]
    salary: String,
}

/// Records read back from a canonical dataset
#[derive(Debug, Default)]
pub struct DatasetRead {
    pub records: Vec<CanonicalRecord>,
    /// Rows that did not satisfy the canonical invariants
    pub skipped: usize,
}

/// Read a canonical dataset previously written by [`encode_csv`]
pub fn read_dataset<R: Read>(reader: R) -> Result<DatasetRead> {
    let table = RegionTable::us();
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    crate::pipeline::ingestion::check_headers("dataset", &headers, &OUTPUT_COLUMNS)?;

    let mut read = DatasetRead::default();
    for (index, result) in csv_reader.deserialize::<DatasetRow>().enumerate() {
        let parsed = match result {
            Ok(row) => parse_dataset_row(&row, &table),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(_) => None,
        };
        match parsed {
            Some(record) => read.records.push(record),
            None => {
                warn!(row = index + 1, "Skipping non-canonical dataset row");
                read.skipped += 1;
            }
        }
    }
    Ok(read)
}

fn parse_dataset_row(row: &DatasetRow, table: &RegionTable) -> Option<CanonicalRecord> {
    let title = JobTitle::from_label(&row.title)?;
    let location = match row.location.trim() {
        "Remote" => Location::Remote,
        code if code.len() == 2 && code.bytes().all(|b| b.is_ascii_uppercase()) => {
            Location::State(table.lookup(code)?)
        }
        _ => return None,
    };
    let skills = row
        .skills
        .split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    let salary: f64 = row.salary.trim().parse().ok()?;
    if !(salary.is_finite() && salary > 0.0) {
        return None;
    }
    Some(CanonicalRecord {
        title,
        location,
        skills,
        salary,
    })
}
