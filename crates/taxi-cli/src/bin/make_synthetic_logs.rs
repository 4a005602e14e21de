//! Generate synthetic flight logs that taxi along resolved routes.
//!
//! The output directory can be fed straight to `build_dataset`.

use anyhow::{Context, Result};
use chrono::{Duration, TimeZone, Utc};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::PathBuf;
use taxi_cli::sim::{synthesize_track, TaxiPath, TrackProfile};
use taxi_cli::{init_tracing, write_flight_log, Config};
use taxi_core::features::resolve_coordinates;
use taxi_core::{NetworkCache, RouteResolver};

/// Write simulated flight logs along taxi routes
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Route to taxi along; repeat for several routes
    #[arg(long = "route", required = true)]
    routes: Vec<String>,

    /// Logs generated per route
    #[arg(long, default_value_t = 5)]
    count: usize,

    /// Output directory
    #[arg(long, default_value = "data/synthetic_flights")]
    out_dir: PathBuf,

    /// Mean taxi speed in m/s
    #[arg(long, default_value_t = 8.0)]
    speed: f64,

    /// Spread of the taxi speed between logs (m/s)
    #[arg(long, default_value_t = 2.0)]
    speed_spread: f64,

    /// GPS noise in meters
    #[arg(long, default_value_t = 3.0)]
    noise: f64,

    /// Seconds between samples
    #[arg(long, default_value_t = 5.0)]
    interval: f64,

    /// RNG seed for reproducible output
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Vertex table (overrides TAXI_VERTEX_FILE)
    #[arg(long)]
    vertex_file: Option<PathBuf>,

    /// Segment table (overrides TAXI_SEGMENT_FILE)
    #[arg(long)]
    segment_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing()?;
    let args = Args::parse();

    let config = Config::from_env().with_overrides(args.vertex_file, args.segment_file, None);
    let cache = NetworkCache::new();
    let graph = cache
        .ensure_loaded(&config.network_source())
        .context("loading taxiway network")?;
    let resolver = RouteResolver::new(&graph);

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let base = Utc
        .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
        .single()
        .context("invalid base time")?;
    let mut written = 0usize;

    for (route_no, route) in args.routes.iter().enumerate() {
        let resolved = match resolver.resolve(route) {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::warn!("Skipping route {}: {}", route, err);
                continue;
            }
        };
        for issue in &resolved.issues {
            tracing::info!("{}: {}", route, issue);
        }
        let points = resolve_coordinates(&resolved.path, &*graph)?;

        for i in 0..args.count {
            let spread = args.speed_spread.abs();
            let speed = if spread > 0.0 {
                (args.speed + rng.random_range(-spread..=spread)).max(1.5)
            } else {
                args.speed
            };
            let path = TaxiPath::new(points.clone(), speed);
            let profile = TrackProfile {
                callsign: format!("SIM{:03}", written + 1),
                start: base + Duration::minutes((route_no * args.count + i) as i64 * 30),
                sample_interval_s: args.interval,
                noise_m: args.noise,
                ..TrackProfile::default()
            };
            let samples = synthesize_track(&path, &profile, &mut rng);

            let file_path = args
                .out_dir
                .join(format!("{}_{:03}.csv", profile.callsign.to_lowercase(), i));
            let file = fs::File::create(&file_path)
                .with_context(|| format!("creating {}", file_path.display()))?;
            write_flight_log(file, &samples)?;
            tracing::debug!(
                "{}: {} samples, {:.0} m at {:.1} m/s",
                file_path.display(),
                samples.len(),
                path.distance_m,
                speed
            );
            written += 1;
        }
    }

    println!("Wrote {} synthetic flight log(s) to {}", written, args.out_dir.display());
    Ok(())
}
