//! Geometry features of a vertex path.

use crate::config::EngineConfig;
use crate::error::{Result, TaxiError};
use crate::graph::TaxiwayGraph;
use crate::models::{GeoPoint, PathFeatureVector, VertexId};
use crate::spatial::{count_turns, mean_angle, path_length, turn_angles_with_epsilon};
use std::collections::HashMap;

/// Anything that can turn a vertex id into a position.
pub trait CoordinateLookup {
    fn coordinate(&self, vertex: VertexId) -> Option<GeoPoint>;
}

impl CoordinateLookup for TaxiwayGraph {
    fn coordinate(&self, vertex: VertexId) -> Option<GeoPoint> {
        self.vertex(vertex).map(|v| v.point())
    }
}

impl CoordinateLookup for HashMap<VertexId, GeoPoint> {
    fn coordinate(&self, vertex: VertexId) -> Option<GeoPoint> {
        self.get(&vertex).copied()
    }
}

/// Positions of a vertex path, in path order.
pub fn resolve_coordinates<L>(path: &[VertexId], lookup: &L) -> Result<Vec<GeoPoint>>
where
    L: CoordinateLookup + ?Sized,
{
    path.iter()
        .map(|vertex| lookup.coordinate(*vertex).ok_or(TaxiError::Lookup(*vertex)))
        .collect()
}

/// Features of already resolved positions.
pub fn features_from_points(points: &[GeoPoint], config: &EngineConfig) -> PathFeatureVector {
    let angles = turn_angles_with_epsilon(points, config.turn_epsilon_m);
    PathFeatureVector {
        length_m: path_length(points),
        num_turns: count_turns(&angles, config.turn_threshold_deg),
        sharpness_deg: mean_angle(&angles),
    }
}

/// Length, turn count and sharpness of a vertex path.
///
/// Fails with [`TaxiError::Lookup`] on the first vertex missing from `lookup`.
pub fn path_features<L>(
    path: &[VertexId],
    lookup: &L,
    config: &EngineConfig,
) -> Result<PathFeatureVector>
where
    L: CoordinateLookup + ?Sized,
{
    let points = resolve_coordinates(path, lookup)?;
    Ok(features_from_points(&points, config))
}
