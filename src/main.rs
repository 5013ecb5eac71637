use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;
use tracing::{info, warn};

use job_canon::config::Config;
use job_canon::logging;
use job_canon::metrics;
use job_canon::pipeline::processing::location::{LocationMatch, LocationNormalizer};
use job_canon::pipeline::processing::salary::SalaryParser;
use job_canon::pipeline::processing::skills::SkillCanonicalizer;
use job_canon::pipeline::processing::tally::SkillTally;
use job_canon::pipeline::{self, Pipeline, RunSummary};
use job_canon::storage::{self, CsvFileSink};

#[derive(Parser)]
#[command(name = "job_canon")]
#[command(about = "Normalize scraped job postings into one canonical dataset")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest every configured source and write the canonical dataset
    Run {
        /// Config file (defaults to $JOB_CANON_CONFIG, then job_canon.toml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override the output dataset path
        #[arg(long)]
        output: Option<PathBuf>,
        /// Write a JSON run summary here
        #[arg(long)]
        summary: Option<PathBuf>,
        /// Number of most common skills to report
        #[arg(long, default_value_t = 10)]
        top_skills: usize,
        /// Write a Prometheus metrics snapshot here after the run
        #[arg(long)]
        metrics_out: Option<PathBuf>,
    },
    /// Skill frequency report for an existing canonical dataset
    Tally {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = 20)]
        top: usize,
        /// Break the report down by job title
        #[arg(long)]
        by_title: bool,
    },
    /// Apply a single normalization step to a literal value
    Inspect {
        #[command(subcommand)]
        target: InspectTarget,
    },
}

#[derive(Subcommand)]
enum InspectTarget {
    Salary { text: String },
    Location { text: String },
    Skills { text: String },
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            output,
            summary,
            top_skills,
            metrics_out,
        } => run(config, output, summary, top_skills, metrics_out),
        Commands::Tally { input, top, by_title } => tally(input, top, by_title),
        Commands::Inspect { target } => inspect(target),
    }
}

fn run(
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
    summary: Option<PathBuf>,
    top_skills: usize,
    metrics_out: Option<PathBuf>,
) -> anyhow::Result<()> {
    if metrics_out.is_some() && !metrics::init_metrics() {
        warn!("Metrics snapshot requested but no recorder could be installed");
    }

    let mut config = Config::load_or_default(config_path.as_deref())?;
    if let Some(path) = output {
        config.output.path = path;
    }
    if let Some(path) = summary {
        config.output.summary = Some(path);
    }

    let pipeline = Pipeline::from_config(&config)?;
    info!(sources = ?pipeline.registry().list_sources(), "Starting run");

    let mut sink = CsvFileSink::new(&config.output.path);
    let (result, report) = pipeline::run_into(&pipeline, &mut sink)?;

    println!("\n📊 Pipeline Results:");
    for stats in &result.sources {
        println!(
            "   {}: {} rows, {} candidates, {} skipped, {} quarantined, {} location fallbacks",
            stats.source_id,
            stats.rows_read,
            stats.candidates,
            stats.skipped(),
            stats.quarantined,
            stats.location_fallbacks
        );
    }
    println!("   Dropped (no skills): {}", result.dropped_empty_skills);
    println!("   Emitted: {}", result.records.len());
    println!("   Output file: {}", config.output.path.display());
    println!("   SHA-256: {}", report.sha256);

    if top_skills > 0 {
        println!("\n🔝 Top skills:");
        for (skill, count) in result.tally().most_common(top_skills) {
            println!("   {count:>5}  {skill}");
        }
    }

    if let Some(path) = &config.output.summary {
        RunSummary::new(&result, report, top_skills)
            .write(path)
            .with_context(|| format!("writing run summary to {}", path.display()))?;
        println!("💾 Summary written to {}", path.display());
    }

    if let Some(path) = metrics_out {
        if let Some(snapshot) = metrics::render() {
            fs::write(&path, snapshot)
                .with_context(|| format!("writing metrics snapshot to {}", path.display()))?;
            println!("📈 Metrics written to {}", path.display());
        }
    }

    Ok(())
}

fn tally(input: PathBuf, top: usize, by_title: bool) -> anyhow::Result<()> {
    let file = File::open(&input).with_context(|| format!("opening {}", input.display()))?;
    let dataset = storage::read_dataset(BufReader::new(file))?;
    if dataset.skipped > 0 {
        warn!(skipped = dataset.skipped, "Some dataset rows were not canonical");
    }

    let tally = SkillTally::from_records(&dataset.records);
    println!(
        "📊 {} records, {} distinct skills",
        dataset.records.len(),
        tally.distinct()
    );

    if by_title {
        for (title, skills) in tally.most_common_by_title(top) {
            println!("\n{title}:");
            for (skill, count) in skills {
                println!("   {count:>5}  {skill}");
            }
        }
    } else {
        for (skill, count) in tally.most_common(top) {
            println!("   {count:>5}  {skill}");
        }
    }
    Ok(())
}

fn inspect(target: InspectTarget) -> anyhow::Result<()> {
    let config = Config::load_or_default(None)?;
    match target {
        InspectTarget::Salary { text } => {
            match SalaryParser::new(&config.salary).parse(&text) {
                Some(value) => println!("{value:.2}"),
                None => println!("unparseable"),
            }
        }
        InspectTarget::Location { text } => {
            let resolved = LocationNormalizer::default().resolve(Some(&text));
            let note = match resolved {
                LocationMatch::Unrecognized => " (fallback: unrecognized)",
                _ => "",
            };
            println!("{}{}", resolved.location(), note);
        }
        InspectTarget::Skills { text } => {
            let canonicalizer = SkillCanonicalizer::new(&config.skills)?;
            let skills = canonicalizer.canonicalize(Some(&text));
            if skills.is_empty() {
                println!("(no skills)");
            }
            for skill in skills {
                println!("{skill}");
            }
        }
    }
    Ok(())
}
