//! Geographic primitives.
//!
//! Coordinates are validated at construction time, so code that receives a
//! `GeoPoint` can trust it holds a real position on the globe.

use std::fmt;

/// Error returned when constructing a point from out-of-range coordinates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinate: {reason}")]
pub struct InvalidGeoPoint {
    reason: &'static str,
}

/// A WGS84 coordinate pair.
///
/// Latitude is restricted to `[-90, 90]` and longitude to `[-180, 180]`;
/// anything else (including NaN) is a construction error.
///
/// # Examples
///
/// ```
/// use transit_server::domain::GeoPoint;
///
/// let p = GeoPoint::new(28.1234, -15.4321).unwrap();
/// assert_eq!(p.lat(), 28.1234);
/// assert_eq!(p.lon(), -15.4321);
///
/// assert!(GeoPoint::new(90.0001, 0.0).is_err());
/// assert!(GeoPoint::new(0.0, -180.0001).is_err());
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    /// Create a point, validating both coordinates.
    pub fn new(lat: f64, lon: f64) -> Result<Self, InvalidGeoPoint> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(InvalidGeoPoint {
                reason: "latitude must be within [-90, 90]",
            });
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(InvalidGeoPoint {
                reason: "longitude must be within [-180, 180]",
            });
        }
        Ok(Self { lat, lon })
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Midpoint of two points in coordinate space.
    ///
    /// Good enough for centering a street-graph download; not a geodesic
    /// midpoint.
    pub fn midpoint(&self, other: &GeoPoint) -> GeoPoint {
        GeoPoint {
            lat: (self.lat + other.lat) / 2.0,
            lon: (self.lon + other.lon) / 2.0,
        }
    }
}

impl fmt::Debug for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeoPoint({}, {})", self.lat, self.lon)
    }
}

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters.
pub fn haversine_distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lon1 = a.lon.to_radians();
    let lat2 = b.lat.to_radians();
    let lon2 = b.lon.to_radians();

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let s = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * s.sqrt().asin()
}

/// Summed great-circle length of a polyline in meters.
///
/// Fewer than two points has zero length.
pub fn polyline_distance_m(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance_m(w[0], w[1]))
        .sum()
}
