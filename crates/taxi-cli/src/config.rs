//! CLI configuration from environment.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use taxi_core::{EngineConfig, NetworkSource};

pub const SCALER_FILE: &str = "scaler.json";
pub const AVERAGE_SPEED_FILE: &str = "average_speed.json";
pub const DATASET_FILE: &str = "dataset.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub vertex_file: PathBuf,
    pub segment_file: PathBuf,
    pub artifact_dir: PathBuf,
    pub engine_config: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            vertex_file: env::var("TAXI_VERTEX_FILE")
                .unwrap_or_else(|_| "data/taxiway_vertices.csv".to_string())
                .into(),
            segment_file: env::var("TAXI_SEGMENT_FILE")
                .unwrap_or_else(|_| "data/taxiway_segments.csv".to_string())
                .into(),
            artifact_dir: env::var("TAXI_ARTIFACT_DIR")
                .unwrap_or_else(|_| "artifacts".to_string())
                .into(),
            engine_config: env::var("TAXI_ENGINE_CONFIG").ok().map(PathBuf::from),
        }
    }

    /// Replace paths with the ones given on the command line.
    pub fn with_overrides(
        mut self,
        vertex_file: Option<PathBuf>,
        segment_file: Option<PathBuf>,
        artifact_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(path) = vertex_file {
            self.vertex_file = path;
        }
        if let Some(path) = segment_file {
            self.segment_file = path;
        }
        if let Some(path) = artifact_dir {
            self.artifact_dir = path;
        }
        self
    }

    pub fn network_source(&self) -> NetworkSource {
        NetworkSource::new(&self.vertex_file, &self.segment_file)
    }

    /// Engine thresholds from `TAXI_ENGINE_CONFIG`, defaults otherwise.
    pub fn engine(&self) -> Result<EngineConfig> {
        match &self.engine_config {
            Some(path) => EngineConfig::from_json_file(path)
                .with_context(|| format!("reading engine config {}", path.display())),
            None => Ok(EngineConfig::default()),
        }
    }

    pub fn artifact(&self, name: &str) -> PathBuf {
        self.artifact_dir.join(name)
    }
}
