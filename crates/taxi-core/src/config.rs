//! Thresholds shared by dataset construction and inference.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the matching and feature engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Samples farther than this from every vertex are treated as noise (meters)
    pub nearest_vertex_threshold_m: f64,
    /// Ground runs with fewer samples are discarded
    pub min_ground_samples: usize,
    /// A turn angle above this counts as a turn (degrees)
    pub turn_threshold_deg: f64,
    /// Added to segment lengths before normalizing direction vectors (meters)
    pub turn_epsilon_m: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            nearest_vertex_threshold_m: 30.0,
            min_ground_samples: 3,
            turn_threshold_deg: 10.0,
            turn_epsilon_m: 1e-9,
        }
    }
}

impl EngineConfig {
    /// Load a config from a JSON file; missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
