//! Projection of GPS samples onto taxiway vertices.

use crate::config::EngineConfig;
use crate::graph::TaxiwayGraph;
use crate::models::{GeoPoint, GroundSegment, Vertex, VertexId};
use crate::spatial::haversine_distance;

/// Nearest vertex to a sample, with its distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestVertex {
    pub vertex: VertexId,
    pub distance_m: f64,
}

/// Snaps ground samples to the closest vertex of the vertex table.
#[derive(Debug, Clone)]
pub struct MapMatcher<'a> {
    vertices: &'a [Vertex],
    threshold_m: f64,
}

impl<'a> MapMatcher<'a> {
    pub fn new(graph: &'a TaxiwayGraph, threshold_m: f64) -> Self {
        Self {
            vertices: graph.vertices(),
            threshold_m,
        }
    }

    pub fn from_config(graph: &'a TaxiwayGraph, config: &EngineConfig) -> Self {
        Self::new(graph, config.nearest_vertex_threshold_m)
    }

    /// Closest vertex by great-circle distance.
    ///
    /// Vertices are scanned in ascending index order and only a strictly
    /// smaller distance replaces the current best, so equidistant vertices
    /// resolve to the lowest index.
    pub fn nearest(&self, point: GeoPoint) -> Option<NearestVertex> {
        let mut best: Option<NearestVertex> = None;
        for vertex in self.vertices {
            let distance_m = haversine_distance(point.lat, point.lon, vertex.lat, vertex.lon);
            if best.is_none_or(|b| distance_m < b.distance_m) {
                best = Some(NearestVertex {
                    vertex: vertex.index,
                    distance_m,
                });
            }
        }
        best
    }

    /// Vertex path followed by a sequence of positions.
    ///
    /// Samples with non-finite coordinates or farther than the threshold from
    /// every vertex are dropped. Consecutive repeats are collapsed. The result
    /// may be empty or a single vertex; callers need at least two.
    pub fn match_points(&self, points: &[GeoPoint]) -> Vec<VertexId> {
        let mut path: Vec<VertexId> = Vec::new();
        let mut dropped = 0usize;

        for point in points {
            if !point.is_finite() {
                dropped += 1;
                continue;
            }
            match self.nearest(*point) {
                Some(nearest) if nearest.distance_m <= self.threshold_m => {
                    if path.last() != Some(&nearest.vertex) {
                        path.push(nearest.vertex);
                    }
                }
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            tracing::debug!(
                "Map matching dropped {} of {} samples beyond {} m",
                dropped,
                points.len(),
                self.threshold_m
            );
        }
        path
    }

    pub fn match_segment(&self, segment: &GroundSegment) -> Vec<VertexId> {
        self.match_points(&segment.points)
    }
}
