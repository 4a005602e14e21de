//! Predict the taxi time of a route such as "RW27-C3-C-F5-F".

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use taxi_cli::config::{AVERAGE_SPEED_FILE, SCALER_FILE};
use taxi_cli::{init_tracing, Config};
use taxi_core::scoring::ident_length_estimate;
use taxi_core::{
    predict_taxi_time, AverageSpeedModel, FeatureScaler, IdentCatalog, NetworkCache,
    TaxiTimeModel,
};

/// Resolve a taxi route and predict its duration
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Route, dash or comma separated (e.g. "RW27-C3-C-F5-F")
    #[arg(long, required_unless_present = "list")]
    route: Option<String>,

    /// List the taxiways and runways of the network and exit
    #[arg(long)]
    list: bool,

    /// Vertex table (overrides TAXI_VERTEX_FILE)
    #[arg(long)]
    vertex_file: Option<PathBuf>,

    /// Segment table (overrides TAXI_SEGMENT_FILE)
    #[arg(long)]
    segment_file: Option<PathBuf>,

    /// Directory holding fitted models (overrides TAXI_ARTIFACT_DIR)
    #[arg(long)]
    artifacts: Option<PathBuf>,

    /// Average taxi speed used when no fitted model is available (m/s)
    #[arg(long, default_value_t = 8.0)]
    speed: f64,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn print_catalog(catalog: &IdentCatalog) {
    let groups = [
        ("Runways", &catalog.runways),
        ("Main taxiways", &catalog.main_taxiways),
        ("Other taxiways", &catalog.others),
    ];
    for (title, entries) in groups {
        if entries.is_empty() {
            continue;
        }
        println!("{}:", title);
        for entry in entries.iter() {
            println!("  {:<8} {} edge(s)", entry.ident, entry.edges);
        }
    }
    println!("{} ident(s) total", catalog.len());
}

fn load_speed_model(config: &Config, fallback_mps: f64) -> AverageSpeedModel {
    let path = config.artifact(AVERAGE_SPEED_FILE);
    match AverageSpeedModel::from_json_file(&path) {
        Ok(model) => model,
        Err(err) => {
            tracing::info!(
                "No fitted speed model at {} ({}), using {} m/s",
                path.display(),
                err,
                fallback_mps
            );
            AverageSpeedModel::new(fallback_mps)
        }
    }
}

fn load_scaler(config: &Config) -> FeatureScaler {
    let path = config.artifact(SCALER_FILE);
    FeatureScaler::from_json_file(&path).unwrap_or_else(|err| {
        tracing::info!("No scaler at {} ({}), features left unscaled", path.display(), err);
        FeatureScaler::default()
    })
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

    if args.list {
        print_catalog(&graph.catalog());
        return Ok(());
    }
    let Some(route) = args.route else {
        anyhow::bail!("--route is required");
    };

    let speed_model = load_speed_model(&config, args.speed);
    let scaler = load_scaler(&config);
    let models: [&dyn TaxiTimeModel; 1] = [&speed_model];

    let report = predict_taxi_time(&graph, &route, &scaler, &models, &engine);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Route: {}", report.route);
    if !report.success {
        anyhow::bail!(
            "could not resolve route: {}",
            report.error.as_deref().unwrap_or("unknown error")
        );
    }

    println!("Normalized: {}", report.normalized_route.join(" -> "));
    println!(
        "Vertex path: {}",
        report
            .vertex_path
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    );
    for issue in &report.issues {
        println!("  note: {}", issue);
    }
    if let Some(stats) = &report.path_stats {
        println!(
            "Path: {:.1} m ({:.0} ft), {} turn(s), sharpness {:.2} deg",
            stats.path_length_m, stats.path_length_ft, stats.num_turns, stats.sharpness
        );
    }
    for prediction in &report.predictions {
        println!("  {:<16} {:.1} s", prediction.model, prediction.seconds);
    }
    for error in &report.model_errors {
        println!("  model error: {}", error);
    }
    if let Some(ensemble) = report.ensemble_s {
        println!("Predicted taxi time: {:.1} s ({:.1} min)", ensemble, ensemble / 60.0);
    }

    match ident_length_estimate(&graph, &route, speed_model.avg_speed_mps) {
        Ok(estimate) => println!(
            "Whole-taxiway estimate: {:.0} m, {:.1} s",
            estimate.distance_m, estimate.time_s
        ),
        Err(err) => tracing::debug!("Ident length estimate unavailable: {}", err),
    }

    Ok(())
}
