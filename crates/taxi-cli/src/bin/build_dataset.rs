//! Build training examples from a directory of flight log CSVs.
//!
//! Writes the examples plus the fitted feature scaler and average-speed model
//! to the artifacts directory. A seeded share of the examples can be held out
//! to report validation error.

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};
use taxi_cli::config::{AVERAGE_SPEED_FILE, DATASET_FILE, SCALER_FILE};
use taxi_cli::{examples_from_logs, init_tracing, list_flight_logs, Config};
use taxi_core::dataset::write_examples;
use taxi_core::scoring::evaluate;
use taxi_core::{AverageSpeedModel, DatasetBuilder, FeatureScaler, NetworkCache};

/// Turn recorded flight logs into taxi-time training examples
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory of flight log CSV files
    #[arg(long, default_value = "data/flights")]
    logs: PathBuf,

    /// Share of examples held out for validation (0 disables)
    #[arg(long, default_value_t = 0.2)]
    holdout: f64,

    /// RNG seed of the train/validation split
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Vertex table (overrides TAXI_VERTEX_FILE)
    #[arg(long)]
    vertex_file: Option<PathBuf>,

    /// Segment table (overrides TAXI_SEGMENT_FILE)
    #[arg(long)]
    segment_file: Option<PathBuf>,

    /// Output directory (overrides TAXI_ARTIFACT_DIR)
    #[arg(long)]
    artifacts: Option<PathBuf>,
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
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

    let files = list_flight_logs(&args.logs)
        .with_context(|| format!("listing {}", args.logs.display()))?;
    tracing::info!(
        "Processing {} flight log(s) from {}",
        files.len(),
        args.logs.display()
    );

    let mut builder = DatasetBuilder::new(&graph, engine);
    let (examples, failed_files) = examples_from_logs(&mut builder, &files);

    fs::create_dir_all(&config.artifact_dir)
        .with_context(|| format!("creating {}", config.artifact_dir.display()))?;

    let dataset_path = config.artifact(DATASET_FILE);
    let file = fs::File::create(&dataset_path)
        .with_context(|| format!("creating {}", dataset_path.display()))?;
    write_examples(file, &examples)?;

    let mut shuffled = examples.clone();
    shuffled.shuffle(&mut StdRng::seed_from_u64(args.seed));
    let holdout = (shuffled.len() as f64 * args.holdout.clamp(0.0, 0.9)).round() as usize;
    let (validation, training) = shuffled.split_at(holdout);

    let features: Vec<_> = training.iter().map(|e| e.features).collect();
    let scaler = FeatureScaler::fit(&features);
    write_json(&config.artifact(SCALER_FILE), &scaler)?;

    match AverageSpeedModel::fit(training) {
        Some(model) => {
            println!("Average taxi speed: {:.2} m/s", model.avg_speed_mps);
            write_json(&config.artifact(AVERAGE_SPEED_FILE), &model)?;
            if !validation.is_empty() {
                let metrics = evaluate(validation, &model, &scaler, &*graph);
                println!(
                    "Validation ({} example(s)): MAE {:.1} s, RMSE {:.1} s",
                    metrics.count, metrics.mae_s, metrics.rmse_s
                );
            }
        }
        None => tracing::warn!("No example with a plausible speed; speed model not written"),
    }

    let summary = builder.summary();
    println!(
        "Saved {} training example(s) to {}",
        examples.len(),
        dataset_path.display()
    );
    println!(
        "  tracks: {}, ground segments: {}, too short: {}, non-positive time: {}",
        summary.tracks, summary.ground_segments, summary.short_paths, summary.non_positive_times
    );
    println!(
        "  unlocated vertices: {}, unreadable files: {}",
        summary.lookup_failures, failed_files
    );

    Ok(())
}
