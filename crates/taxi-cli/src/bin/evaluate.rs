//! Score fitted taxi-time models against held-out flight logs.
//!
//! Runs the dataset pipeline over the logs and reports the mean absolute and
//! root mean squared error of every model found in the artifacts directory.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use taxi_cli::config::{AVERAGE_SPEED_FILE, SCALER_FILE};
use taxi_cli::{examples_from_logs, init_tracing, list_flight_logs, Config};
use taxi_core::scoring::{evaluate, EvaluationMetrics};
use taxi_core::{AverageSpeedModel, DatasetBuilder, FeatureScaler, NetworkCache, TaxiTimeModel};

/// Report MAE and RMSE of the fitted models on held-out logs
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory of held-out flight log CSV files
    #[arg(long, default_value = "data/test_flights")]
    logs: PathBuf,

    /// Vertex table (overrides TAXI_VERTEX_FILE)
    #[arg(long)]
    vertex_file: Option<PathBuf>,

    /// Segment table (overrides TAXI_SEGMENT_FILE)
    #[arg(long)]
    segment_file: Option<PathBuf>,

    /// Directory holding fitted models (overrides TAXI_ARTIFACT_DIR)
    #[arg(long)]
    artifacts: Option<PathBuf>,

    /// Print the metrics as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    init_tracing()?;
    let args = Args::parse();

    let config =
        Config::from_env().with_overrides(args.vertex_file, args.segment_file, args.artifacts);
    let engine = config.engine()?;
    let cache = NetworkCache::new();
    let graph = cache
        .ensure_loaded(&config.network_source())
        .context("loading taxiway network")?;

    let speed_path = config.artifact(AVERAGE_SPEED_FILE);
    let speed_model = AverageSpeedModel::from_json_file(&speed_path)
        .with_context(|| format!("reading {}", speed_path.display()))?;
    let scaler_path = config.artifact(SCALER_FILE);
    let scaler = FeatureScaler::from_json_file(&scaler_path)
        .with_context(|| format!("reading {}", scaler_path.display()))?;
    let models: [&dyn TaxiTimeModel; 1] = [&speed_model];

    let files = list_flight_logs(&args.logs)
        .with_context(|| format!("listing {}", args.logs.display()))?;
    let mut builder = DatasetBuilder::new(&graph, engine);
    let (examples, failed_files) = examples_from_logs(&mut builder, &files);
    if examples.is_empty() {
        anyhow::bail!("no usable test examples in {}", args.logs.display());
    }

    let metrics: Vec<EvaluationMetrics> = models
        .iter()
        .map(|model| evaluate(&examples, *model, &scaler, &*graph))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        return Ok(());
    }

    println!(
        "Evaluated {} example(s) from {} log(s) ({} unreadable)",
        examples.len(),
        files.len(),
        failed_files
    );
    for m in &metrics {
        println!(
            "  {:<16} MAE {:.2} s  RMSE {:.2} s  ({} scored, {} failed)",
            m.model, m.mae_s, m.rmse_s, m.count, m.failed
        );
    }

    Ok(())
}
