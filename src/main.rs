use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use bottling_line::domain::line_config::LineConfig;
use bottling_line::domain::simulator::simulator::LineSimulator;
use bottling_line::domain::utils::statistics;
use bottling_line::{load_line_config, logger};

/// Simulates a bottling line: filling machines sharing one station with an
/// empty-bottle place and a full-bottle place.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// JSON line configuration. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<String>,

    /// Number of filling machines.
    #[arg(short, long)]
    workers: Option<usize>,

    /// Run duration in seconds. Runs until interrupted when omitted.
    #[arg(short, long)]
    duration: Option<u64>,

    /// Write a CSV event log to this file.
    #[arg(long)]
    stats: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logger::init();
    log::info!("Logger initialized. Starting bottling line.");

    let mut config = match &cli.config {
        Some(path) => load_line_config(path).with_context(|| format!("loading '{}'", path))?,
        None => LineConfig::default(),
    };

    if let Some(workers) = cli.workers {
        anyhow::ensure!(workers > 0, "--workers must be at least 1");
        config.worker_count = workers;
    }
    if let Some(seconds) = cli.duration {
        config.run_duration = Some(Duration::from_secs(seconds));
    }
    if cli.stats.is_some() {
        config.statistics_file = cli.stats;
    }

    if let Some(file) = &config.statistics_file {
        statistics::init_global(Some(file.clone())).with_context(|| format!("creating statistics file '{}'", file))?;
    }

    let mut simulator = LineSimulator::new(config);
    let report = simulator.run()?;

    statistics::flush_global();
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
