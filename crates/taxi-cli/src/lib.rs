//! Taxi CLI - command line tools around the taxi-time engine.
//!
//! Binaries:
//! - taxi_predict: resolve a route and predict its taxi time
//! - build_dataset: turn recorded flight logs into training examples
//! - make_synthetic_logs: generate flight logs along resolved routes
//! - evaluate: score fitted models against held-out flight logs

pub mod config;
pub mod flight_log;
pub mod pipeline;
pub mod sim;

pub use config::Config;
pub use flight_log::{read_flight_log, read_flight_log_from_path, write_flight_log, FlightLog};
pub use pipeline::{examples_from_logs, list_flight_logs};

/// Install the tracing subscriber shared by every binary.
pub fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("taxi_cli=debug".parse()?)
                .add_directive("taxi_core=info".parse()?),
        )
        .try_init()?;
    Ok(())
}
