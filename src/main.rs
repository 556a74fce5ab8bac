mod agents;
mod automation;
mod config;
mod console;
mod dataset;
mod integrations;
mod kpi;
mod metrics;
mod openai;
mod orchestrator;
mod report;
mod util;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::Config;
use crate::orchestrator::Orchestrator;

#[derive(Debug, Parser)]
struct Args {
    /// Path to the financial transactions CSV
    #[arg(long, default_value = "data/sample.csv")]
    data: PathBuf,

    /// Output directory for the Markdown report
    #[arg(long, default_value = "outputs")]
    out_dir: PathBuf,

    /// File that accumulates run metrics, one appended section per run
    #[arg(long, default_value = "README.md")]
    status_file: PathBuf,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    // logging
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter_layer).init();

    tracing::info!("Starting financial analyst pipeline");

    // All environment access happens here, once
    let config = Config::load()?;

    let dataset = dataset::load_financial_csv(&args.data)
        .with_context(|| format!("failed to load dataset from {}", args.data.display()))?;
    tracing::info!(
        "Loaded {} records from {} (date: {}, revenue: {}, expenses: {})",
        dataset.records.len(),
        args.data.display(),
        dataset.has_date,
        dataset.has_revenue,
        dataset.has_expenses
    );

    let orchestrator = Orchestrator::new(config)?;
    let outcome = orchestrator
        .run(&dataset, &args.out_dir, &args.status_file)
        .await?;

    console::display_outcome(&outcome);
    Ok(())
}
