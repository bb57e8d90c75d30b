use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use rbot_eval::system::CancelToken;
use rbot_eval::tracking::ReplayTrackerFactory;
use rbot_eval::{BatchRunner, BenchmarkConfig};

/// Evaluate recorded tracker output against RBOT-style ground truth.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// YAML benchmark configuration. Defaults are used if omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dataset root containing the frames and ground-truth pose files.
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Directory of recorded estimates: <estimates>/<sequence>/<body>.txt
    #[arg(long)]
    estimates: PathBuf,

    /// Evaluated frames per configuration.
    #[arg(long)]
    frames: Option<usize>,

    /// Worker threads.
    #[arg(long)]
    jobs: Option<usize>,

    /// Per-configuration time limit in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Use the full RBOT object/sequence matrix.
    #[arg(long)]
    full: bool,

    /// Also write the report as JSON.
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("rbot_eval=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    info!(
        "Dataset {} ({} bodies x {} sequences)",
        config.dataset_dir.display(),
        config.bodies.len(),
        config.sequences.len()
    );

    let cancel = CancelToken::new();
    if let Err(e) = cancel.install_ctrlc_handler() {
        warn!("Could not install Ctrl-C handler: {}", e);
    }

    let factory = ReplayTrackerFactory::new(&args.estimates, config.frame_count);
    let runner = BatchRunner::new(config, factory).with_cancel(cancel);
    let report = runner.run(|r| println!("{}", r.line()));

    if let Some(mean) = report.mean_success_rate() {
        info!(
            "{} configurations completed, mean success rate {:.4}",
            report.completed().count(),
            mean
        );
    }

    if let Some(path) = &args.json {
        let json = report.to_json().context("failed to serialize report")?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    if !report.reports.is_empty() && report.completed().count() == 0 {
        bail!("no configuration completed");
    }

    Ok(())
}

fn build_config(args: &Args) -> Result<BenchmarkConfig> {
    let mut config = match &args.config {
        Some(path) => BenchmarkConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None if args.full => BenchmarkConfig::full_rbot(),
        None => BenchmarkConfig::default(),
    };

    if let Some(dataset) = &args.dataset {
        config.dataset_dir = dataset.clone();
    }
    if let Some(frames) = args.frames {
        config.frame_count = frames;
    }
    if let Some(jobs) = args.jobs {
        config.jobs = jobs;
    }
    if args.timeout_secs.is_some() {
        config.timeout_secs = args.timeout_secs;
    }
    if args.full && args.config.is_some() {
        let full = BenchmarkConfig::full_rbot();
        config.bodies = full.bodies;
        config.sequences = full.sequences;
    }

    config.validate()?;
    Ok(config)
}
