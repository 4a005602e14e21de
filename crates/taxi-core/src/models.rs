//! Core data models for the taxi-time engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a taxiway vertex as it appears in the vertex table.
pub type VertexId = u32;

/// A position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// A surveyed point of the taxiway network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub index: VertexId,
    pub lat: f64,
    pub lon: f64,
}

impl Vertex {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// Physical definition of a taxiway or runway ident.
///
/// The same ident may be spread over several segment records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub ident: String,
    pub vertices: Vec<VertexId>,
}

/// One position report of a recorded flight track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSample {
    pub timestamp: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    /// Reported altitude; exactly zero means the aircraft is on the ground
    pub altitude: f64,
    #[serde(default)]
    pub callsign: Option<String>,
}

impl TrackSample {
    pub fn is_ground(&self) -> bool {
        self.altitude == 0.0
    }
}

/// A contiguous on-ground portion of a track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundSegment {
    pub callsign: Option<String>,
    pub start_ts: DateTime<Utc>,
    pub end_ts: DateTime<Utc>,
    pub points: Vec<GeoPoint>,
}

impl GroundSegment {
    /// Elapsed time between the first and the last ground sample.
    pub fn duration_secs(&self) -> f64 {
        (self.end_ts - self.start_ts).num_milliseconds() as f64 / 1000.0
    }
}

/// Geometry features of a vertex path consumed by the scoring models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathFeatureVector {
    pub length_m: f64,
    pub num_turns: u32,
    pub sharpness_deg: f64,
}

impl PathFeatureVector {
    pub fn as_array(&self) -> [f64; 3] {
        [self.length_m, self.num_turns as f64, self.sharpness_deg]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn ground_segment_duration_uses_millisecond_precision() {
        let segment = GroundSegment {
            callsign: None,
            start_ts: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
            end_ts: Utc.timestamp_millis_opt(1_700_000_090_500).unwrap(),
            points: Vec::new(),
        };
        assert!((segment.duration_secs() - 90.5).abs() < 1e-9);
    }

    #[test]
    fn only_exact_zero_altitude_is_ground() {
        let mut sample = TrackSample {
            timestamp: Utc::now(),
            lat: 40.85,
            lon: -74.06,
            altitude: 0.0,
            callsign: None,
        };
        assert!(sample.is_ground());
        sample.altitude = 25.0;
        assert!(!sample.is_ground());
    }
}
