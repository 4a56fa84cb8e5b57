//! Street-network providers.
//!
//! The planner needs exactly three walking queries (distance, path, street
//! name) against a graph handle fetched for a bounding region. The graph
//! itself is an opaque artifact of the provider; the core never models
//! street-network internals. Every query may be unavailable for a specific
//! pair of points without failing the whole search.

mod cached;

pub use cached::{CachedStreets, StreetCacheConfig};

use crate::domain::{GeoPoint, haversine_distance_m};

/// Error from acquiring a street graph.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StreetError {
    /// Graph for the requested region could not be produced
    #[error("street graph unavailable: {0}")]
    GraphUnavailable(String),
}

/// Capability for walking-network queries.
///
/// `Graph` is an opaque handle: the provider creates it once per request
/// region and answers all walking queries against it. Per-query failures
/// are expressed as `None` so the caller can skip that candidate rather
/// than abort.
pub trait StreetProvider: Send + Sync {
    type Graph;

    /// Fetch a graph covering `radius_m` meters around `center`.
    fn walking_graph(&self, center: GeoPoint, radius_m: f64) -> Result<Self::Graph, StreetError>;

    /// Walking distance in meters, `None` if unavailable for this pair.
    fn walking_distance_m(&self, graph: &Self::Graph, from: GeoPoint, to: GeoPoint)
    -> Option<f64>;

    /// Walking route polyline, `None` if unavailable for this pair.
    fn walking_path(
        &self,
        graph: &Self::Graph,
        from: GeoPoint,
        to: GeoPoint,
    ) -> Option<Vec<GeoPoint>>;

    /// Best-effort street name at a point.
    fn street_name(&self, graph: &Self::Graph, point: GeoPoint) -> Option<String>;
}

/// Graph handle of [`GreatCircleStreets`]: just the requested region.
#[derive(Debug, Clone)]
pub struct GreatCircleGraph {
    pub center: GeoPoint,
    pub radius_m: f64,
}

/// Street provider that approximates walking by great-circle geometry.
///
/// Distances are as-the-crow-flies and paths are straight segments; street
/// names are never known. Useful as the dependency-free default and as the
/// deterministic provider in tests.
#[derive(Debug, Clone, Default)]
pub struct GreatCircleStreets;

impl GreatCircleStreets {
    pub fn new() -> Self {
        Self
    }
}

impl StreetProvider for GreatCircleStreets {
    type Graph = GreatCircleGraph;

    fn walking_graph(&self, center: GeoPoint, radius_m: f64) -> Result<Self::Graph, StreetError> {
        Ok(GreatCircleGraph { center, radius_m })
    }

    fn walking_distance_m(
        &self,
        _graph: &Self::Graph,
        from: GeoPoint,
        to: GeoPoint,
    ) -> Option<f64> {
        Some(haversine_distance_m(from, to))
    }

    fn walking_path(
        &self,
        _graph: &Self::Graph,
        from: GeoPoint,
        to: GeoPoint,
    ) -> Option<Vec<GeoPoint>> {
        Some(vec![from, to])
    }

    fn street_name(&self, _graph: &Self::Graph, _point: GeoPoint) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn great_circle_distance_and_path() {
        let streets = GreatCircleStreets::new();
        let a = GeoPoint::new(0.0, 0.0).unwrap();
        let b = GeoPoint::new(0.0, 0.01).unwrap();

        let graph = streets.walking_graph(a, 1_000.0).unwrap();

        let d = streets.walking_distance_m(&graph, a, b).unwrap();
        assert!(d > 1_000.0 && d < 1_300.0, "got {d}");

        assert_eq!(streets.walking_path(&graph, a, b).unwrap(), vec![a, b]);
        assert_eq!(streets.street_name(&graph, a), None);
    }
}
