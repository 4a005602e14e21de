//! Interface to the taxi-time scoring models.
//!
//! The engine hands each model the resolved vertex path, its coordinates and
//! the feature vector (raw and standardized). How many models run and how
//! their outputs are combined is decided here, not by the models.

use crate::config::EngineConfig;
use crate::dataset::TrainingExample;
use crate::error::{Result, RouteIssue, TaxiError};
use crate::features::{features_from_points, resolve_coordinates, CoordinateLookup};
use crate::graph::TaxiwayGraph;
use crate::models::{GeoPoint, PathFeatureVector, VertexId};
use crate::route::RouteResolver;
use serde::{Deserialize, Serialize};
use std::path::Path;

const METERS_TO_FEET: f64 = 3.28084;
const MIN_PLAUSIBLE_SPEED_MPS: f64 = 1.0;
const MAX_PLAUSIBLE_SPEED_MPS: f64 = 40.0;
const MIN_PLAUSIBLE_TIME_S: f64 = 1.0;

/// Per-feature standardization: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    pub mean: [f64; 3],
    pub scale: [f64; 3],
}

impl Default for FeatureScaler {
    fn default() -> Self {
        Self {
            mean: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl FeatureScaler {
    /// Column means and population standard deviations; a zero deviation
    /// becomes a scale of one.
    pub fn fit(features: &[PathFeatureVector]) -> Self {
        if features.is_empty() {
            return Self::default();
        }
        let n = features.len() as f64;
        let mut mean = [0.0; 3];
        for row in features {
            for (acc, value) in mean.iter_mut().zip(row.as_array()) {
                *acc += value / n;
            }
        }
        let mut variance = [0.0; 3];
        for row in features {
            for ((acc, value), m) in variance.iter_mut().zip(row.as_array()).zip(mean) {
                *acc += (value - m).powi(2) / n;
            }
        }
        let scale = variance.map(|v| {
            let std = v.sqrt();
            if std > 0.0 {
                std
            } else {
                1.0
            }
        });
        Self { mean, scale }
    }

    pub fn transform(&self, features: &PathFeatureVector) -> [f64; 3] {
        let raw = features.as_array();
        std::array::from_fn(|i| (raw[i] - self.mean[i]) / self.scale[i])
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Everything a model may look at for one path.
#[derive(Debug, Clone)]
pub struct ScoringInput<'a> {
    pub vertex_path: &'a [VertexId],
    pub coordinates: &'a [GeoPoint],
    pub features: PathFeatureVector,
    pub scaled_features: [f64; 3],
}

/// A taxi-time predictor.
pub trait TaxiTimeModel: Send + Sync {
    fn name(&self) -> &str;

    /// Predicted taxi duration in seconds.
    fn predict(&self, input: &ScoringInput<'_>) -> Result<f64>;
}

/// Distance over the mean taxi speed seen in training data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageSpeedModel {
    pub avg_speed_mps: f64,
}

impl AverageSpeedModel {
    pub fn new(avg_speed_mps: f64) -> Self {
        Self { avg_speed_mps }
    }

    /// Mean speed over examples with a plausible speed and duration.
    ///
    /// Returns `None` when no example qualifies.
    pub fn fit(examples: &[TrainingExample]) -> Option<Self> {
        let speeds: Vec<f64> = examples
            .iter()
            .filter(|e| e.taxi_time_s > MIN_PLAUSIBLE_TIME_S)
            .map(|e| e.features.length_m / e.taxi_time_s)
            .filter(|s| *s > MIN_PLAUSIBLE_SPEED_MPS && *s < MAX_PLAUSIBLE_SPEED_MPS)
            .collect();
        if speeds.is_empty() {
            return None;
        }
        let avg_speed_mps = speeds.iter().sum::<f64>() / speeds.len() as f64;
        Some(Self { avg_speed_mps })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl TaxiTimeModel for AverageSpeedModel {
    fn name(&self) -> &str {
        "average_speed"
    }

    fn predict(&self, input: &ScoringInput<'_>) -> Result<f64> {
        if !is_valid_speed(self.avg_speed_mps) {
            return Err(TaxiError::Model {
                model: self.name().to_string(),
                reason: format!("invalid average speed {}", self.avg_speed_mps),
            });
        }
        Ok(input.features.length_m / self.avg_speed_mps)
    }
}

/// Error of one model over a set of examples with known taxi times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub model: String,
    /// Examples the model produced a prediction for
    pub count: usize,
    /// Examples skipped because coordinates or the prediction failed
    pub failed: usize,
    pub mae_s: f64,
    pub rmse_s: f64,
}

/// Mean absolute and root mean squared error of `model` against the observed
/// taxi times.
///
/// Features are taken from the examples, scaled with `scaler`, and the path
/// coordinates are resolved through `lookup`. Both errors are zero when no
/// example could be scored.
pub fn evaluate<L>(
    examples: &[TrainingExample],
    model: &dyn TaxiTimeModel,
    scaler: &FeatureScaler,
    lookup: &L,
) -> EvaluationMetrics
where
    L: CoordinateLookup + ?Sized,
{
    let mut count = 0usize;
    let mut failed = 0usize;
    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;

    for example in examples {
        let prediction = resolve_coordinates(&example.vertex_path, lookup).and_then(|coordinates| {
            model.predict(&ScoringInput {
                vertex_path: &example.vertex_path,
                coordinates: &coordinates,
                features: example.features,
                scaled_features: scaler.transform(&example.features),
            })
        });
        match prediction {
            Ok(predicted) if predicted.is_finite() => {
                let error = predicted - example.taxi_time_s;
                abs_sum += error.abs();
                sq_sum += error * error;
                count += 1;
            }
            Ok(predicted) => {
                tracing::debug!("{} returned {} for {}", model.name(), predicted, example.source);
                failed += 1;
            }
            Err(err) => {
                tracing::debug!("Could not score {}: {}", example.source, err);
                failed += 1;
            }
        }
    }

    let (mae_s, rmse_s) = if count > 0 {
        let n = count as f64;
        (abs_sum / n, (sq_sum / n).sqrt())
    } else {
        (0.0, 0.0)
    };
    EvaluationMetrics {
        model: model.name().to_string(),
        count,
        failed,
        mae_s,
        rmse_s,
    }
}

/// Distance and time of a route estimated from whole-ident lengths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdentLengthEstimate {
    pub distance_m: f64,
    pub time_s: f64,
}

/// Sum the full length of every ident named by the route.
///
/// A token is looked up verbatim, then by its alphabetic characters only
/// ("F5" becomes "F"). An unknown token fails the estimate.
pub fn ident_length_estimate(
    graph: &TaxiwayGraph,
    route: &str,
    avg_speed_mps: f64,
) -> Result<IdentLengthEstimate> {
    let lengths = graph.ident_lengths();
    let mut distance_m = 0.0;

    for token in route.split('-').map(|t| t.trim().to_uppercase()) {
        if let Some(length) = lengths.get(&token) {
            distance_m += length;
            continue;
        }
        let alpha: String = token.chars().filter(|c| c.is_alphabetic()).collect();
        if let Some(length) = lengths.get(&alpha) {
            distance_m += length;
            continue;
        }
        let available: Vec<&str> = graph.idents().take(20).collect();
        return Err(TaxiError::Model {
            model: "ident_length".to_string(),
            reason: format!(
                "taxiway '{}' not found (tried '{}'); available: {}",
                token,
                alpha,
                available.join(", ")
            ),
        });
    }

    if !is_valid_speed(avg_speed_mps) {
        return Err(TaxiError::Model {
            model: "ident_length".to_string(),
            reason: format!("invalid average speed {}", avg_speed_mps),
        });
    }
    Ok(IdentLengthEstimate {
        distance_m,
        time_s: distance_m / avg_speed_mps,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStats {
    pub path_length_m: f64,
    pub path_length_ft: f64,
    pub num_turns: u32,
    pub sharpness: f64,
}

impl From<&PathFeatureVector> for PathStats {
    fn from(features: &PathFeatureVector) -> Self {
        Self {
            path_length_m: round_to(features.length_m, 1),
            path_length_ft: (features.length_m * METERS_TO_FEET).round(),
            num_turns: features.num_turns,
            sharpness: round_to(features.sharpness_deg, 2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPrediction {
    pub model: String,
    pub seconds: f64,
}

/// Outcome of a prediction request, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxiTimeReport {
    pub success: bool,
    pub route: String,
    pub normalized_route: Vec<String>,
    pub vertex_path: Vec<VertexId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_stats: Option<PathStats>,
    pub predictions: Vec<ModelPrediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ensemble_s: Option<f64>,
    pub issues: Vec<RouteIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub model_errors: Vec<String>,
}

impl TaxiTimeReport {
    fn failed(route: &str, error: String) -> Self {
        Self {
            success: false,
            route: route.to_string(),
            normalized_route: Vec::new(),
            vertex_path: Vec::new(),
            path_stats: None,
            predictions: Vec::new(),
            ensemble_s: None,
            issues: Vec::new(),
            error: Some(error),
            model_errors: Vec::new(),
        }
    }
}

/// Resolve a route, compute its features and run every model.
///
/// Never panics and never returns `Err`: resolution failures produce a report
/// with `success == false`, model failures are listed in `model_errors` while the
/// remaining models still contribute. The ensemble is the mean of the
/// successful predictions, each rounded to a tenth of a second.
pub fn predict_taxi_time(
    graph: &TaxiwayGraph,
    route: &str,
    scaler: &FeatureScaler,
    models: &[&dyn TaxiTimeModel],
    config: &EngineConfig,
) -> TaxiTimeReport {
    if route.trim().is_empty() {
        return TaxiTimeReport::failed(route, "route cannot be empty".to_string());
    }

    let resolved = match RouteResolver::new(graph).resolve(route) {
        Ok(resolved) => resolved,
        Err(err) => return TaxiTimeReport::failed(route, err.to_string()),
    };
    let coordinates = match resolve_coordinates(&resolved.path, graph) {
        Ok(coordinates) => coordinates,
        Err(err) => return TaxiTimeReport::failed(route, err.to_string()),
    };

    let features = features_from_points(&coordinates, config);
    let input = ScoringInput {
        vertex_path: &resolved.path,
        coordinates: &coordinates,
        features,
        scaled_features: scaler.transform(&features),
    };

    let mut predictions = Vec::new();
    let mut model_errors = Vec::new();
    for model in models {
        match model.predict(&input) {
            Ok(seconds) if seconds.is_finite() => predictions.push(ModelPrediction {
                model: model.name().to_string(),
                seconds: round_to(seconds, 1),
            }),
            Ok(seconds) => model_errors.push(format!("{} returned {}", model.name(), seconds)),
            Err(err) => {
                tracing::warn!("Model {} failed: {}", model.name(), err);
                model_errors.push(err.to_string());
            }
        }
    }

    let ensemble_s = if predictions.is_empty() {
        None
    } else {
        let total: f64 = predictions.iter().map(|p| p.seconds).sum();
        Some(round_to(total / predictions.len() as f64, 1))
    };

    TaxiTimeReport {
        success: true,
        route: route.to_string(),
        normalized_route: resolved.normalized,
        path_stats: Some(PathStats::from(&features)),
        vertex_path: resolved.path,
        predictions,
        ensemble_s,
        issues: resolved.issues,
        error: None,
        model_errors,
    }
}

fn is_valid_speed(speed_mps: f64) -> bool {
    speed_mps.is_finite() && speed_mps > 0.0
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
