//! Extraction of on-ground runs from a flight track.

use crate::config::EngineConfig;
use crate::models::{GeoPoint, GroundSegment, TrackSample};

/// Splits tracks into maximal runs of zero-altitude samples.
#[derive(Debug, Clone)]
pub struct TrackSegmenter {
    min_samples: usize,
}

impl Default for TrackSegmenter {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl TrackSegmenter {
    pub fn new(min_samples: usize) -> Self {
        Self { min_samples }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.min_ground_samples)
    }

    /// Ground segments of a track, in time order.
    ///
    /// Samples are sorted by timestamp first (stable, so equal timestamps
    /// keep their input order). A new run starts whenever the ground flag
    /// differs from the previous sample's; airborne runs and runs shorter
    /// than the minimum are dropped. Positions are copied as recorded.
    pub fn segment(&self, samples: &[TrackSample]) -> Vec<GroundSegment> {
        let mut ordered: Vec<&TrackSample> = samples.iter().collect();
        ordered.sort_by_key(|sample| sample.timestamp);

        let mut segments = Vec::new();
        for run in ordered.chunk_by(|a, b| a.is_ground() == b.is_ground()) {
            let (Some(first), Some(last)) = (run.first(), run.last()) else {
                continue;
            };
            if !first.is_ground() || run.len() < self.min_samples {
                continue;
            }
            segments.push(GroundSegment {
                callsign: first.callsign.clone(),
                start_ts: first.timestamp,
                end_ts: last.timestamp,
                points: run.iter().map(|s| GeoPoint::new(s.lat, s.lon)).collect(),
            });
        }

        tracing::debug!(
            "Extracted {} ground segments from {} samples",
            segments.len(),
            samples.len()
        );
        segments
    }
}
