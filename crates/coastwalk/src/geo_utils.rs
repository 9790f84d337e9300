//! # Geographic Utilities
//!
//! Distance along a walked track.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`geodesic_distance`] | Distance between two points on the WGS84 ellipsoid, in meters |
//! | [`path_length_m`] | Total length of a track in meters |
//! | [`path_length_km`] | Total length of a track in kilometers |
//!
//! ## Algorithm Notes
//!
//! Distances are geodesics on the WGS84 ellipsoid (Karney's algorithm, via
//! [`geo::Geodesic`]), not spherical great-circle approximations. Track
//! length is the sum over consecutive point pairs, so it is always
//! non-negative and zero for fewer than two points.

use geo::{Distance, Geodesic, Point};
use serde::Serialize;

/// A latitude/longitude pair in degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GpsPoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// `[lat, lon]`, the order Leaflet expects.
    #[must_use]
    pub fn lat_lon(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}

/// Geodesic distance between two points in meters.
///
/// # Example
///
/// ```rust
/// use coastwalk::geo_utils::{geodesic_distance, GpsPoint};
///
/// let london = GpsPoint::new(51.5074, -0.1278);
/// let paris = GpsPoint::new(48.8566, 2.3522);
///
/// let distance = geodesic_distance(&london, &paris);
/// assert!((distance - 343_900.0).abs() < 3_000.0);
/// ```
#[inline]
#[must_use]
pub fn geodesic_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Geodesic::distance(point1, point2)
}

/// Total length of a track in meters. Empty or single-point tracks are 0.
#[must_use]
pub fn path_length_m(points: &[GpsPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| geodesic_distance(&w[0], &w[1]))
        .sum()
}

/// Total length of a track in kilometers.
#[must_use]
pub fn path_length_km(points: &[GpsPoint]) -> f64 {
    path_length_m(points) / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_distance_same_point() {
        let p = GpsPoint::new(55.9533, -3.1883);
        assert!(geodesic_distance(&p, &p).abs() < 1e-9);
    }

    #[test]
    fn test_distance_known_value() {
        // London to Paris is approximately 344 km
        let london = GpsPoint::new(51.5074, -0.1278);
        let paris = GpsPoint::new(48.8566, 2.3522);
        assert!(approx_eq(geodesic_distance(&london, &paris), 343_900.0, 3_000.0));
    }

    #[test]
    fn test_distance_symmetric_and_non_negative() {
        let pairs = [
            (GpsPoint::new(56.0, -3.0), GpsPoint::new(56.1, -2.9)),
            (GpsPoint::new(-33.9, 151.2), GpsPoint::new(51.5, -0.1)),
            (GpsPoint::new(0.0, 179.9), GpsPoint::new(0.0, -179.9)),
        ];
        for (a, b) in pairs {
            let ab = geodesic_distance(&a, &b);
            let ba = geodesic_distance(&b, &a);
            assert!(ab >= 0.0);
            assert!(approx_eq(ab, ba, 1e-6), "{ab} != {ba}");
        }
    }

    #[test]
    fn test_antimeridian_is_short() {
        let a = GpsPoint::new(0.0, 179.9);
        let b = GpsPoint::new(0.0, -179.9);
        assert!(geodesic_distance(&a, &b) < 25_000.0);
    }

    #[test]
    fn test_path_length_empty_and_single() {
        assert!(path_length_m(&[]).abs() < f64::EPSILON);
        assert!(path_length_m(&[GpsPoint::new(56.0, -3.0)]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_path_length_three_points() {
        // Two legs of ~2.5 km due north
        let track = [
            GpsPoint::new(56.0, -3.0),
            GpsPoint::new(56.0225, -3.0),
            GpsPoint::new(56.045, -3.0),
        ];
        assert!(approx_eq(path_length_km(&track), 5.0, 0.1));
    }

    #[test]
    fn test_path_length_counts_backtracking() {
        let out_and_back = [
            GpsPoint::new(56.0, -3.0),
            GpsPoint::new(56.01, -3.0),
            GpsPoint::new(56.0, -3.0),
        ];
        let one_way = path_length_m(&out_and_back[..2]);
        assert!(approx_eq(path_length_m(&out_and_back), 2.0 * one_way, 1e-6));
    }

    #[test]
    fn test_point_validity() {
        assert!(GpsPoint::new(56.0, -3.0).is_valid());
        assert!(!GpsPoint::new(91.0, 0.0).is_valid());
        assert!(!GpsPoint::new(0.0, -181.0).is_valid());
        assert!(!GpsPoint::new(f64::NAN, 0.0).is_valid());
        assert_eq!(GpsPoint::new(1.0, 2.0).lat_lon(), [1.0, 2.0]);
    }
}
