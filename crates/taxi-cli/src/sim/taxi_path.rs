//! Taxi movement along a vertex path.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use taxi_core::spatial::{haversine_distance, offset_position};
use taxi_core::{GeoPoint, TrackSample};

/// Constant-speed movement along a polyline.
#[derive(Debug, Clone)]
pub struct TaxiPath {
    points: Vec<GeoPoint>,
    /// Distance from the start to each point
    cumulative_m: Vec<f64>,
    pub speed_mps: f64,
    pub distance_m: f64,
    pub duration: f64,
}

impl TaxiPath {
    pub fn new(points: Vec<GeoPoint>, speed_mps: f64) -> Self {
        let mut cumulative_m = Vec::with_capacity(points.len());
        let mut total = 0.0;
        for (i, point) in points.iter().enumerate() {
            if i > 0 {
                let prev = points[i - 1];
                total += haversine_distance(prev.lat, prev.lon, point.lat, point.lon);
            }
            cumulative_m.push(total);
        }
        let duration = if speed_mps > 0.0 {
            total / speed_mps
        } else {
            0.0
        };

        Self {
            points,
            cumulative_m,
            speed_mps,
            distance_m: total,
            duration,
        }
    }

    /// Position `t` seconds after leaving the first point.
    pub fn position(&self, t: f64) -> Option<GeoPoint> {
        let first = *self.points.first()?;
        if self.duration <= 0.0 {
            return Some(first);
        }

        let travelled = (t / self.duration).clamp(0.0, 1.0) * self.distance_m;
        let leg = self
            .cumulative_m
            .partition_point(|d| *d <= travelled)
            .clamp(1, self.points.len() - 1);

        let (start, end) = (self.points[leg - 1], self.points[leg]);
        let leg_length = self.cumulative_m[leg] - self.cumulative_m[leg - 1];
        let progress = if leg_length > 0.0 {
            ((travelled - self.cumulative_m[leg - 1]) / leg_length).clamp(0.0, 1.0)
        } else {
            1.0
        };

        Some(GeoPoint::new(
            start.lat + progress * (end.lat - start.lat),
            start.lon + progress * (end.lon - start.lon),
        ))
    }

    pub fn start(&self) -> Option<GeoPoint> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<GeoPoint> {
        self.points.last().copied()
    }
}

/// How a synthetic flight around the taxi is recorded.
#[derive(Debug, Clone)]
pub struct TrackProfile {
    pub callsign: String,
    /// Time the aircraft starts taxiing
    pub start: DateTime<Utc>,
    pub sample_interval_s: f64,
    /// Uniform horizontal GPS noise, +/- meters
    pub noise_m: f64,
    /// Airborne samples recorded before and after the taxi
    pub airborne_samples: usize,
    pub approach_altitude_m: f64,
}

impl Default for TrackProfile {
    fn default() -> Self {
        Self {
            callsign: "SIM001".to_string(),
            start: DateTime::<Utc>::UNIX_EPOCH,
            sample_interval_s: 5.0,
            noise_m: 3.0,
            airborne_samples: 3,
            approach_altitude_m: 450.0,
        }
    }
}

fn jitter<R: Rng + ?Sized>(point: GeoPoint, noise_m: f64, rng: &mut R) -> GeoPoint {
    let noise_m = noise_m.abs();
    if noise_m == 0.0 {
        return point;
    }
    let north = rng.random_range(-noise_m..=noise_m);
    let east = rng.random_range(-noise_m..=noise_m);
    let (lat, lon) = offset_position(point.lat, point.lon, north, east);
    GeoPoint::new(lat, lon)
}

fn at_offset(start: DateTime<Utc>, seconds: f64) -> DateTime<Utc> {
    start + Duration::milliseconds((seconds * 1000.0).round() as i64)
}

/// Record a landing, the taxi along `path` and a departure.
///
/// Ground samples have altitude exactly zero and cover the whole path,
/// including its final point. Airborne samples sit over the path ends.
pub fn synthesize_track<R: Rng + ?Sized>(
    path: &TaxiPath,
    profile: &TrackProfile,
    rng: &mut R,
) -> Vec<TrackSample> {
    let (Some(first), Some(last)) = (path.start(), path.end()) else {
        return Vec::new();
    };
    let interval = profile.sample_interval_s.max(0.1);
    let airborne = profile.airborne_samples;
    let sample = |seconds: f64, point: GeoPoint, altitude: f64| TrackSample {
        timestamp: at_offset(profile.start, seconds),
        lat: point.lat,
        lon: point.lon,
        altitude,
        callsign: Some(profile.callsign.clone()),
    };

    let mut samples = Vec::new();
    for i in 0..airborne {
        let remaining = (airborne - i) as f64;
        let altitude = profile.approach_altitude_m * remaining / airborne as f64;
        let point = jitter(first, profile.noise_m, rng);
        samples.push(sample(-remaining * interval, point, altitude));
    }

    let mut t = 0.0;
    while t < path.duration {
        if let Some(point) = path.position(t) {
            samples.push(sample(t, jitter(point, profile.noise_m, rng), 0.0));
        }
        t += interval;
    }
    samples.push(sample(path.duration, jitter(last, profile.noise_m, rng), 0.0));

    for i in 1..=airborne {
        let altitude = profile.approach_altitude_m * i as f64 / airborne as f64;
        let point = jitter(last, profile.noise_m, rng);
        samples.push(sample(path.duration + i as f64 * interval, point, altitude));
    }

    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use taxi_core::TrackSegmenter;

    fn path() -> TaxiPath {
        TaxiPath::new(
            vec![
                GeoPoint::new(40.8500, -74.0600),
                GeoPoint::new(40.8510, -74.0600),
                GeoPoint::new(40.8520, -74.0600),
            ],
            10.0,
        )
    }

    #[test]
    fn test_taxi_path_endpoints() {
        let path = path();
        let start = path.position(0.0).unwrap();
        let end = path.position(path.duration + 100.0).unwrap();
        assert!((start.lat - 40.85).abs() < 1e-9);
        assert!((end.lat - 40.852).abs() < 1e-9);
        assert!((path.distance_m - 222.4).abs() < 0.5);
    }

    #[test]
    fn test_taxi_path_midpoint_is_middle_vertex() {
        let path = path();
        let mid = path.position(path.duration / 2.0).unwrap();
        assert!((mid.lat - 40.851).abs() < 1e-6);
        assert!((mid.lon + 74.06).abs() < 1e-9);
    }

    #[test]
    fn test_synthetic_track_has_one_ground_run() {
        let path = path();
        let profile = TrackProfile {
            noise_m: 0.0,
            ..TrackProfile::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let samples = synthesize_track(&path, &profile, &mut rng);

        let ground: Vec<_> = samples.iter().filter(|s| s.is_ground()).collect();
        assert_eq!(samples.len(), ground.len() + 2 * profile.airborne_samples);
        assert!(samples.first().is_some_and(|s| !s.is_ground()));
        assert!(ground.last().is_some_and(|s| (s.lat - 40.852).abs() < 1e-9));

        let segments = TrackSegmenter::default().segment(&samples);
        assert_eq!(segments.len(), 1);
        assert!((segments[0].duration_secs() - path.duration).abs() < 0.01);
    }

    #[test]
    fn test_noise_stays_within_bounds() {
        let path = path();
        let profile = TrackProfile {
            noise_m: 5.0,
            ..TrackProfile::default()
        };
        let mut rng = StdRng::seed_from_u64(42);
        for sample in synthesize_track(&path, &profile, &mut rng) {
            let off_track = haversine_distance(sample.lat, -74.06, sample.lat, sample.lon);
            assert!(off_track <= 5.0 * 1.01);
        }
    }

    #[test]
    fn test_empty_path_has_no_samples() {
        let path = TaxiPath::new(Vec::new(), 10.0);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(synthesize_track(&path, &TrackProfile::default(), &mut rng).is_empty());
    }
}
