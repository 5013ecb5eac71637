use anyhow::Result;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use job_canon::config::Config;
use job_canon::pipeline::{self, Pipeline, RunSummary};
use job_canon::storage::{self, CsvFileSink, DatasetSink, MemorySink};
use job_canon::{JobTitle, Location, PipelineError};

const QUALIFICATIONS_CSV: &str = "\
Job Name,Location,Salary,Qualifications
Data Scientist,\"Austin, TX\",\"$120,000\",Python; SQL; 3+ years
";

const FLEXJOBS_CSV: &str = "\
Job Title,Job Name,Description,Remote Option,Salary Range
Machine Learning Engineer,ML Engineer,Train models,Remote,55 per hour
";

fn config_for(dir: &Path, qualifications: &str, flexjobs: &str, flexjobs_requires_skills: bool) -> Result<Config> {
    let qualifications_path = dir.join("processed_job_data.csv");
    let flexjobs_path = dir.join("flexjobs_jobs.csv");
    fs::write(&qualifications_path, qualifications)?;
    fs::write(&flexjobs_path, flexjobs)?;

    let toml = format!(
        r#"
[[sources]]
name = "simplyjobs"
kind = "qualifications"
path = "{}"

[[sources]]
name = "flexjobs"
kind = "flexjobs"
path = "{}"
require_skills = {}

[output]
path = "{}"
"#,
        qualifications_path.display(),
        flexjobs_path.display(),
        flexjobs_requires_skills,
        dir.join("filtered_data.csv").display()
    );
    Ok(Config::from_toml_str(&toml)?)
}

#[test]
fn test_end_to_end_drops_skill_less_flexjobs_row() -> Result<()> {
    let dir = tempdir()?;
    let config = config_for(dir.path(), QUALIFICATIONS_CSV, FLEXJOBS_CSV, true)?;
    let pipeline = Pipeline::from_config(&config)?;

    let mut sink = CsvFileSink::new(&config.output.path);
    let (result, report) = pipeline::run_into(&pipeline, &mut sink)?;

    assert_eq!(result.rows_read(), 2);
    assert_eq!(result.candidates(), 2);
    assert_eq!(result.dropped_empty_skills, 1);
    assert_eq!(report.records, 1);

    let written = fs::read_to_string(&config.output.path)?;
    assert_eq!(
        written,
        "Title,Location,Skills,Salary\nData Scientist,TX,python; sql,120000.00\n"
    );
    Ok(())
}

#[test]
fn test_source_opt_out_keeps_salary_only_rows() -> Result<()> {
    let dir = tempdir()?;
    let config = config_for(dir.path(), QUALIFICATIONS_CSV, FLEXJOBS_CSV, false)?;
    let result = Pipeline::from_config(&config)?.run()?;

    assert_eq!(result.records.len(), 2);
    let flex = &result.records[1];
    assert_eq!(flex.title, JobTitle::AiMl);
    assert_eq!(flex.location, Location::Remote);
    assert!(flex.skills.is_empty());
    assert_eq!(flex.salary_formatted(), "110000.00");
    Ok(())
}

#[test]
fn test_reruns_are_byte_identical() -> Result<()> {
    let dir = tempdir()?;
    let qualifications = "\
Job Name,Location,Salary,Qualifications
Software Engineering,\"New York, NY\",$95000,Rust; Go; Senior; Windows
AI/ML,Remote - US,45.9K,PyTorch; python; CUDA
Data Scientist,Atlantis,20 per hour,R; Statistics
";
    let config = config_for(dir.path(), qualifications, FLEXJOBS_CSV, true)?;
    let pipeline = Pipeline::from_config(&config)?;

    let mut sink = CsvFileSink::new(&config.output.path);
    let (_, first) = pipeline::run_into(&pipeline, &mut sink)?;
    let first_bytes = fs::read(&config.output.path)?;
    let (_, second) = pipeline::run_into(&pipeline, &mut sink)?;
    let second_bytes = fs::read(&config.output.path)?;

    assert_eq!(first.sha256, second.sha256);
    assert_eq!(first_bytes, second_bytes);

    let mut memory = MemorySink::new();
    let third = memory.write(&pipeline.run()?.records)?;
    assert_eq!(third.sha256, first.sha256);
    assert_eq!(
        memory.as_str(),
        "Title,Location,Skills,Salary\n\
         Software Engineering,NY,go; rust,95000.00\n\
         AI/ML,Remote,cuda; python; pytorch,45900.00\n\
         Data Scientist,Remote,r; statistics,40000.00\n"
    );
    Ok(())
}

#[test]
fn test_output_is_source_major() -> Result<()> {
    let dir = tempdir()?;
    let qualifications = "\
Job Name,Location,Salary,Qualifications
Data Scientist,Remote,$100000,a1
Data Scientist,Remote,$100000,a2
";
    let flexjobs = "\
Job Title,Job Name,Description,Remote Option,Salary Range
Software Engineer,b1,x,Remote,$100000
Software Engineer,b2,x,Remote,$100000
";
    let config = config_for(dir.path(), qualifications, flexjobs, false)?;
    let result = Pipeline::from_config(&config)?.run()?;

    let titles: Vec<JobTitle> = result.records.iter().map(|r| r.title).collect();
    assert_eq!(
        titles,
        vec![
            JobTitle::DataScientist,
            JobTitle::DataScientist,
            JobTitle::SoftwareEngineering,
            JobTitle::SoftwareEngineering,
        ]
    );
    assert_eq!(result.records[0].skills_joined(), "a1");
    assert_eq!(result.records[1].skills_joined(), "a2");
    Ok(())
}

#[test]
fn test_missing_source_file_is_fatal() -> Result<()> {
    let dir = tempdir()?;
    let mut config = config_for(dir.path(), QUALIFICATIONS_CSV, FLEXJOBS_CSV, true)?;
    config.sources[1].path = dir.path().join("does_not_exist.csv");

    let mut sink = CsvFileSink::new(&config.output.path);
    let err = pipeline::run_into(&Pipeline::from_config(&config)?, &mut sink).unwrap_err();
    assert!(matches!(err, PipelineError::SourceFile { .. }));
    assert!(!config.output.path.exists());
    Ok(())
}

#[test]
fn test_missing_required_column_is_fatal() -> Result<()> {
    let dir = tempdir()?;
    let flexjobs = "Job Title,Job Name,Description,Salary Range\nData Scientist,x,y,$1\n";
    let config = config_for(dir.path(), QUALIFICATIONS_CSV, flexjobs, true)?;

    let err = Pipeline::from_config(&config)?.run().unwrap_err();
    assert!(matches!(
        err,
        PipelineError::MissingField { ref source_id, ref field }
            if source_id == "flexjobs" && field == "Remote Option"
    ));
    Ok(())
}

#[test]
fn test_summary_and_tally_from_written_dataset() -> Result<()> {
    let dir = tempdir()?;
    let qualifications = "\
Job Name,Location,Salary,Qualifications
Data Scientist,\"Austin, TX\",\"$120,000\",Python; SQL
AI/ML,\"Boston, MA\",$150000,Python; PyTorch
";
    let config = config_for(dir.path(), qualifications, FLEXJOBS_CSV, true)?;
    let pipeline = Pipeline::from_config(&config)?;
    let mut sink = CsvFileSink::new(&config.output.path);
    let (result, report) = pipeline::run_into(&pipeline, &mut sink)?;

    let summary_path = dir.path().join("reports").join("summary.json");
    RunSummary::new(&result, report, 2).write(&summary_path)?;
    let summary: serde_json::Value = serde_json::from_str(&fs::read_to_string(&summary_path)?)?;
    assert_eq!(summary["emitted"], 2);
    assert_eq!(summary["dropped_empty_skills"], 1);
    assert_eq!(summary["top_skills"][0]["skill"], "python");
    assert_eq!(summary["top_skills"][0]["count"], 2);
    assert_eq!(summary["sources"][0]["source_id"], "simplyjobs");

    let dataset = storage::read_dataset(fs::File::open(&config.output.path)?)?;
    assert_eq!(dataset.records, result.records);
    assert_eq!(dataset.skipped, 0);
    Ok(())
}
