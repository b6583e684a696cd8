use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use voice_biomarkers::compose::TaskType;
use voice_biomarkers::config::AnalysisConfig;
use voice_biomarkers::request::{AnalysisReport, AnalysisRequest, Gender};

#[derive(Parser, Debug)]
#[command(
    name = "biomarker_cli",
    about = "Compute speech biomarker features for one recording"
)]
struct Cli {
    /// JSON analysis configuration (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyse the recording described by a request file
    Analyze {
        #[arg(long)]
        request: PathBuf,
        /// Task type, overriding the request's own
        #[arg(long)]
        task: Option<TaskType>,
        /// Speaker gender for the F0 reference norm
        #[arg(long)]
        gender: Option<Gender>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List task types and the feature keys each one produces
    Tasks,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:#}");
            let payload = ErrorPayload {
                status: "error",
                error: format!("{err:#}"),
                features: None,
            };
            match serde_json::to_string(&payload) {
                Ok(json) => println!("{json}"),
                Err(_) => eprintln!("Error: {err:?}"),
            }
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = cli
        .config
        .map(AnalysisConfig::load_from_file)
        .unwrap_or_default();

    match cli.command {
        Commands::Analyze {
            request,
            task,
            gender,
            output,
        } => run_analyze(&config, request, task, gender, output),
        Commands::Tasks => run_tasks(),
    }
}

fn run_analyze(
    config: &AnalysisConfig,
    request_path: PathBuf,
    task: Option<TaskType>,
    gender: Option<Gender>,
    output_path: Option<PathBuf>,
) -> Result<ExitCode> {
    let mut request = AnalysisRequest::load(&request_path)?;
    if gender.is_some() {
        request.gender = gender;
    }

    let report = request
        .run(task, config)
        .with_context(|| format!("processing request {}", request_path.display()))?;
    emit_report(&report, output_path)?;
    Ok(ExitCode::from(0))
}

fn run_tasks() -> Result<ExitCode> {
    let listing: Vec<TaskListing> = TaskType::ALL
        .into_iter()
        .map(|task| TaskListing {
            task_type: task,
            features: task.feature_keys(false),
            with_transcript: task.feature_keys(true),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(ExitCode::from(0))
}

fn emit_report(report: &AnalysisReport, output_path: Option<PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;

    if let Some(path) = output_path {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }

    Ok(())
}

#[derive(Serialize)]
struct ErrorPayload {
    status: &'static str,
    error: String,
    features: Option<()>,
}

#[derive(Serialize)]
struct TaskListing {
    task_type: TaskType,
    features: Vec<&'static str>,
    with_transcript: Vec<&'static str>,
}
