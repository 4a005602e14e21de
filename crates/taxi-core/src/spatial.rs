//! Spatial math for path lengths, turn angles and distance calculations.

use crate::models::GeoPoint;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Default angle above which a heading change counts as a turn.
pub const DEFAULT_TURN_THRESHOLD_DEG: f64 = 10.0;

/// Added to segment lengths so coincident points never divide by zero.
pub const TURN_EPSILON_M: f64 = 1e-9;

/// Calculate distance between two points in meters using Haversine formula.
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
///
/// # Returns
/// Distance in meters
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Great-circle distance between two points in meters.
pub fn distance(p1: GeoPoint, p2: GeoPoint) -> f64 {
    haversine_distance(p1.lat, p1.lon, p2.lat, p2.lon)
}

/// Sum of consecutive great-circle distances. Zero for fewer than two points.
pub fn path_length(points: &[GeoPoint]) -> f64 {
    points.windows(2).map(|pair| distance(pair[0], pair[1])).sum()
}

/// Heading change at every interior point of a path, in degrees.
///
/// Each leg is turned into a direction vector from its local east/north
/// displacement divided by the leg length plus `epsilon_m`. The dot product
/// is clamped to [-1, 1] before `acos`, so coincident points yield a finite
/// angle instead of NaN.
pub fn turn_angles_with_epsilon(points: &[GeoPoint], epsilon_m: f64) -> Vec<f64> {
    if points.len() < 3 {
        return Vec::new();
    }

    points
        .windows(3)
        .map(|triple| {
            let (a, b, c) = (triple[0], triple[1], triple[2]);
            let v1 = unit_direction(a, b, b.lat, epsilon_m);
            let v2 = unit_direction(b, c, b.lat, epsilon_m);
            let dot = (v1.0 * v2.0 + v1.1 * v2.1).clamp(-1.0, 1.0);
            dot.acos().to_degrees().abs()
        })
        .collect()
}

/// [`turn_angles_with_epsilon`] with the default epsilon.
pub fn turn_angles(points: &[GeoPoint]) -> Vec<f64> {
    turn_angles_with_epsilon(points, TURN_EPSILON_M)
}

/// Count turn angles strictly above `threshold_deg`.
pub fn num_turns(points: &[GeoPoint], threshold_deg: f64) -> u32 {
    count_turns(&turn_angles(points), threshold_deg)
}

/// Mean turn angle in degrees, `0.0` when the path has no interior point.
pub fn sharpness(points: &[GeoPoint]) -> f64 {
    mean_angle(&turn_angles(points))
}

pub(crate) fn count_turns(angles: &[f64], threshold_deg: f64) -> u32 {
    angles.iter().filter(|angle| **angle > threshold_deg).count() as u32
}

pub(crate) fn mean_angle(angles: &[f64]) -> f64 {
    if angles.is_empty() {
        return 0.0;
    }
    angles.iter().sum::<f64>() / angles.len() as f64
}

fn unit_direction(from: GeoPoint, to: GeoPoint, ref_lat: f64, epsilon_m: f64) -> (f64, f64) {
    let east = lon_to_meters(to.lon - from.lon, ref_lat);
    let north = lat_to_meters(to.lat - from.lat, ref_lat);
    let length = (east * east + north * north).sqrt() + epsilon_m;
    (east / length, north / length)
}

// ==== ENU (East-North-Up) Coordinate Conversion ====
// These functions convert between meters and degrees using latitude-aware scaling.

/// Meters per degree of latitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lat(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_132.954 - 559.822 * (2.0 * lat_rad).cos() + 1.175 * (4.0 * lat_rad).cos()
        - 0.0023 * (6.0 * lat_rad).cos()
}

/// Meters per degree of longitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lon(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_412.84 * lat_rad.cos() - 93.5 * (3.0 * lat_rad).cos() + 0.118 * (5.0 * lat_rad).cos()
}

/// Convert a north/south offset in meters to degrees latitude.
pub fn meters_to_lat(meters: f64, ref_lat_deg: f64) -> f64 {
    let meters_per_deg = meters_per_deg_lat(ref_lat_deg).max(1e-9);
    meters / meters_per_deg
}

/// Convert an east/west offset in meters to degrees longitude.
/// Requires the reference latitude for proper scaling.
pub fn meters_to_lon(meters: f64, ref_lat_deg: f64) -> f64 {
    let meters_per_deg = meters_per_deg_lon(ref_lat_deg).max(1e-9);
    meters / meters_per_deg
}

/// Convert degrees latitude to meters using local scaling.
pub fn lat_to_meters(deg: f64, ref_lat_deg: f64) -> f64 {
    deg * meters_per_deg_lat(ref_lat_deg)
}

/// Convert degrees longitude to meters at a given latitude.
pub fn lon_to_meters(deg: f64, ref_lat_deg: f64) -> f64 {
    deg * meters_per_deg_lon(ref_lat_deg)
}

/// Offset a position by meters in the north and east directions.
///
/// # Returns
/// (new_lat, new_lon) in degrees
pub fn offset_position(lat: f64, lon: f64, north_m: f64, east_m: f64) -> (f64, f64) {
    (
        lat + meters_to_lat(north_m, lat),
        lon + meters_to_lon(east_m, lat),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon)
    }

    #[test]
    fn test_haversine_known_distance() {
        // ~111km between these points (1 degree latitude)
        let dist = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert!((dist - 111_194.0).abs() < 100.0);
    }

    #[test]
    fn test_haversine_same_point() {
        let here = p(40.8501, -74.0608);
        assert_eq!(distance(here, here), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = p(40.8501, -74.0608);
        let b = p(40.8552, -74.0561);
        assert!((distance(a, b) - distance(b, a)).abs() < 1e-9);
    }

    #[test]
    fn antipodal_points_do_not_produce_nan() {
        let dist = haversine_distance(0.0, 0.0, 0.0, 180.0);
        assert!(dist.is_finite());
        assert!((dist - std::f64::consts::PI * EARTH_RADIUS_M).abs() < 1.0);
    }

    #[test]
    fn path_length_of_short_paths_is_zero() {
        assert_eq!(path_length(&[]), 0.0);
        assert_eq!(path_length(&[p(40.85, -74.06)]), 0.0);
    }

    #[test]
    fn path_length_sums_legs() {
        let points = [p(40.850, -74.060), p(40.851, -74.060), p(40.852, -74.060)];
        let expected = distance(points[0], points[1]) + distance(points[1], points[2]);
        assert!((path_length(&points) - expected).abs() < 1e-9);
    }

    #[test]
    fn collinear_points_have_no_turns() {
        let meridian = [p(40.850, -74.060), p(40.851, -74.060), p(40.852, -74.060)];
        assert_eq!(num_turns(&meridian, DEFAULT_TURN_THRESHOLD_DEG), 0);
        assert!(sharpness(&meridian) < 0.01);

        let diagonal = [p(40.850, -74.060), p(40.851, -74.059), p(40.852, -74.058)];
        assert_eq!(num_turns(&diagonal, DEFAULT_TURN_THRESHOLD_DEG), 0);
        assert!(sharpness(&diagonal) < 0.01);
    }

    #[test]
    fn right_angle_is_ninety_degrees() {
        let base = p(40.850, -74.060);
        let (north_lat, north_lon) = offset_position(base.lat, base.lon, 100.0, 0.0);
        let (east_lat, east_lon) = offset_position(north_lat, north_lon, 0.0, 100.0);
        let points = [base, p(north_lat, north_lon), p(east_lat, east_lon)];

        let angles = turn_angles(&points);
        assert_eq!(angles.len(), 1);
        assert!((angles[0] - 90.0).abs() < 0.5, "got {}", angles[0]);
        assert_eq!(num_turns(&points, DEFAULT_TURN_THRESHOLD_DEG), 1);
    }

    #[test]
    fn coincident_points_yield_finite_angles() {
        let here = p(40.85, -74.06);
        let angles = turn_angles(&[here, here, p(40.851, -74.06)]);
        assert_eq!(angles.len(), 1);
        assert!(angles[0].is_finite());
    }

    #[test]
    fn fewer_than_three_points_have_no_angles() {
        assert!(turn_angles(&[p(40.85, -74.06), p(40.86, -74.06)]).is_empty());
        assert_eq!(sharpness(&[p(40.85, -74.06)]), 0.0);
    }
}
