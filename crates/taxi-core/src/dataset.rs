//! Training examples from recorded flight tracks.
//!
//! Each track is split into ground segments, every segment is map-matched to
//! a vertex path and the path's features are paired with the observed taxi
//! time.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::features::path_features;
use crate::graph::TaxiwayGraph;
use crate::matcher::MapMatcher;
use crate::models::{PathFeatureVector, TrackSample, VertexId};
use crate::segmenter::TrackSegmenter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    /// Name of the track the example came from, usually its file name
    pub source: String,
    pub callsign: Option<String>,
    pub start_ts: DateTime<Utc>,
    pub end_ts: DateTime<Utc>,
    pub taxi_time_s: f64,
    pub vertex_path: Vec<VertexId>,
    pub features: PathFeatureVector,
}

/// Counters of one dataset build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub tracks: usize,
    pub ground_segments: usize,
    pub short_paths: usize,
    pub non_positive_times: usize,
    /// Matched vertices missing from the coordinate table
    pub lookup_failures: usize,
    pub examples: usize,
}

pub struct DatasetBuilder<'a> {
    graph: &'a TaxiwayGraph,
    segmenter: TrackSegmenter,
    matcher: MapMatcher<'a>,
    config: EngineConfig,
    summary: DatasetSummary,
}

impl<'a> DatasetBuilder<'a> {
    pub fn new(graph: &'a TaxiwayGraph, config: EngineConfig) -> Self {
        Self {
            graph,
            segmenter: TrackSegmenter::from_config(&config),
            matcher: MapMatcher::from_config(graph, &config),
            config,
            summary: DatasetSummary::default(),
        }
    }

    /// Examples of one track.
    ///
    /// Segments whose matched path has fewer than two vertices, whose
    /// duration is not positive or whose vertices cannot be located are
    /// counted and skipped.
    pub fn process_track(&mut self, source: &str, samples: &[TrackSample]) -> Vec<TrainingExample> {
        self.summary.tracks += 1;
        let segments = self.segmenter.segment(samples);
        self.summary.ground_segments += segments.len();

        let mut examples = Vec::new();
        for segment in segments {
            let vertex_path = self.matcher.match_segment(&segment);
            if vertex_path.len() < 2 {
                self.summary.short_paths += 1;
                continue;
            }

            let taxi_time_s = segment.duration_secs();
            if taxi_time_s <= 0.0 {
                self.summary.non_positive_times += 1;
                continue;
            }

            let features = match path_features(&vertex_path, self.graph, &self.config) {
                Ok(features) => features,
                Err(err) => {
                    tracing::warn!("Skipping segment of {}: {}", source, err);
                    self.summary.lookup_failures += 1;
                    continue;
                }
            };

            examples.push(TrainingExample {
                source: source.to_string(),
                callsign: segment.callsign,
                start_ts: segment.start_ts,
                end_ts: segment.end_ts,
                taxi_time_s,
                vertex_path,
                features,
            });
        }

        self.summary.examples += examples.len();
        tracing::debug!("{} produced {} example(s)", source, examples.len());
        examples
    }

    pub fn summary(&self) -> &DatasetSummary {
        &self.summary
    }
}

/// Write examples as a pretty-printed JSON array.
pub fn write_examples<W: Write>(writer: W, examples: &[TrainingExample]) -> Result<()> {
    serde_json::to_writer_pretty(writer, examples)?;
    Ok(())
}

pub fn read_examples<R: std::io::Read>(reader: R) -> Result<Vec<TrainingExample>> {
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Segment, Vertex};
    use chrono::{Duration, TimeZone};

    fn graph() -> TaxiwayGraph {
        let vertices = (1..=3)
            .map(|index| Vertex {
                index,
                lat: 40.85 + index as f64 * 0.001,
                lon: -74.06,
            })
            .collect();
        TaxiwayGraph::build(
            vertices,
            &[Segment {
                ident: "A".to_string(),
                vertices: vec![1, 2, 3],
            }],
        )
    }

    fn sample(secs: i64, vertex: u32, altitude: f64) -> TrackSample {
        TrackSample {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
                + Duration::seconds(secs),
            lat: 40.85 + vertex as f64 * 0.001,
            lon: -74.06,
            altitude,
            callsign: Some("N123".to_string()),
        }
    }

    #[test]
    fn ground_roll_becomes_example() {
        let graph = graph();
        let mut builder = DatasetBuilder::new(&graph, EngineConfig::default());
        let track = [
            sample(0, 1, 1500.0),
            sample(10, 1, 0.0),
            sample(40, 2, 0.0),
            sample(70, 3, 0.0),
            sample(80, 3, 800.0),
        ];
        let examples = builder.process_track("log.csv", &track);
        assert_eq!(examples.len(), 1);
        let example = &examples[0];
        assert_eq!(example.vertex_path, vec![1, 2, 3]);
        assert_eq!(example.taxi_time_s, 60.0);
        assert_eq!(example.callsign.as_deref(), Some("N123"));
        assert!(example.features.length_m > 200.0);
        assert_eq!(builder.summary().examples, 1);
    }

    #[test]
    fn stationary_segment_is_skipped() {
        let graph = graph();
        let mut builder = DatasetBuilder::new(&graph, EngineConfig::default());
        let track = [sample(0, 1, 0.0), sample(10, 1, 0.0), sample(20, 1, 0.0)];
        assert!(builder.process_track("parked.csv", &track).is_empty());
        assert_eq!(builder.summary().short_paths, 1);
        assert_eq!(builder.summary().ground_segments, 1);
    }

    #[test]
    fn unknown_vertices_are_counted() {
        let graph = graph();
        // Matching against a network with an extra vertex 4 the builder's
        // graph cannot locate.
        let mut wider_vertices: Vec<Vertex> = graph.vertices().to_vec();
        wider_vertices.push(Vertex {
            index: 4,
            lat: 40.854,
            lon: -74.06,
        });
        let wider = TaxiwayGraph::build(wider_vertices, &[]);

        let config = EngineConfig::default();
        let mut builder = DatasetBuilder::new(&graph, config.clone());
        builder.matcher = MapMatcher::from_config(&wider, &config);

        let track = [sample(0, 2, 0.0), sample(30, 3, 0.0), sample(60, 4, 0.0)];
        assert!(builder.process_track("log.csv", &track).is_empty());
        let summary = builder.summary();
        assert_eq!(summary.lookup_failures, 1);
        assert_eq!(
            summary.ground_segments,
            summary.short_paths
                + summary.non_positive_times
                + summary.lookup_failures
                + summary.examples
        );
    }

    #[test]
    fn examples_survive_json() {
        let graph = graph();
        let mut builder = DatasetBuilder::new(&graph, EngineConfig::default());
        let track = [sample(0, 1, 0.0), sample(30, 2, 0.0), sample(60, 3, 0.0)];
        let examples = builder.process_track("log.csv", &track);

        let mut buffer = Vec::new();
        write_examples(&mut buffer, &examples).unwrap();
        let restored = read_examples(buffer.as_slice()).unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].vertex_path, vec![1, 2, 3]);
        assert_eq!(restored[0].start_ts, examples[0].start_ts);
        assert_eq!(restored[0].taxi_time_s, 60.0);
    }
}
