//! synthesize: CI text-to-speech pipeline (Amazon Polly + S3).

mod changes;
mod config;
mod error;
mod pipeline;
mod reporter;
mod sigv4;
mod synthesizer;
mod uploader;
mod voice;

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use voice::Voice;

#[derive(Parser, Debug)]
#[command(
    name = "synthesize",
    about = "Convert text files to speech with Amazon Polly and upload to S3"
)]
struct Args {
    /// Text files to convert (manual trigger)
    files: Vec<PathBuf>,

    /// Voice used for synthesis
    #[arg(long, value_enum)]
    voice: Option<Voice>,

    /// Detect changed files in a git commit range instead
    #[arg(long, value_name = "BASE..HEAD", conflicts_with = "files")]
    diff: Option<String>,

    /// Pull request number to comment on (needs GITHUB_TOKEN and GITHUB_REPOSITORY)
    #[arg(long)]
    pr: Option<u64>,

    /// Path to polly-pipeline.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Results file path (overrides config)
    #[arg(long)]
    results_file: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging (suppress noisy HTTP internals)
    let filter = if args.verbose {
        EnvFilter::new("debug,reqwest=info,hyper=info")
    } else {
        EnvFilter::new("info,reqwest=warn,hyper=warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("synthesize starting");

    // Load config
    let mut config = config::Config::load(args.config.as_deref());
    if let Some(path) = args.results_file {
        config.report.results_file = path;
    }

    let voice = args.voice.unwrap_or_else(|| config.default_voice());
    info!("Voice: {voice}");

    // Which files go through the pipeline
    let files = if !args.files.is_empty() {
        args.files
    } else if let Some(range) = &args.diff {
        changes::changed_files(range, &config.content)?
    } else {
        Vec::new()
    };

    if files.is_empty() {
        info!("Empty change set, nothing to synthesize");
        return Ok(());
    }

    // Credentials are checked before the first API call
    let credentials = sigv4::Credentials::from_env()?;

    let results_file = config.report.results_file.clone();
    let pipeline = pipeline::Pipeline::new(config, credentials)?;
    let results = pipeline.run(&files, voice).await?;

    reporter::write_results(&results_file, &results)?;
    reporter::append_job_summary(&results);

    if let Some(pr) = args.pr {
        match (
            std::env::var("GITHUB_TOKEN"),
            std::env::var("GITHUB_REPOSITORY"),
        ) {
            (Ok(token), Ok(repo)) => {
                reporter::post_pr_comment(&repo, pr, &token, &results).await?;
            }
            _ => tracing::warn!(
                "--pr given but GITHUB_TOKEN/GITHUB_REPOSITORY not set, skipping comment"
            ),
        }
    }

    info!("Converted {} file(s)", results.len());
    Ok(())
}
