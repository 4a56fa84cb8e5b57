//! Graph-handle caching for street providers.
//!
//! Fetching a street graph is the expensive step of a search (the real
//! provider downloads and assembles a network). Requests for nearby centers
//! can share one graph, so centers are bucketed onto a coarse grid and the
//! resulting handles cached. Caching lives here, in the provider layer;
//! the core always asks for a graph per call and assumes nothing about
//! reuse.

use std::time::Duration;

use moka::sync::Cache as MokaCache;

use crate::domain::GeoPoint;

use super::{StreetError, StreetProvider};

/// Meters per degree of latitude, used to size the bucket grid.
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Cache key: bucketed center coordinates plus the requested radius.
type GraphKey = (i64, i64, u64);

/// Configuration for the street-graph cache.
#[derive(Debug, Clone)]
pub struct StreetCacheConfig {
    /// TTL for cached graph handles.
    pub ttl: Duration,

    /// Maximum number of cached graphs.
    pub max_capacity: u64,

    /// Bucket edge length in meters; centers within the same bucket share
    /// a graph.
    pub bucket_m: f64,
}

impl Default for StreetCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(600),
            max_capacity: 64,
            bucket_m: 500.0,
        }
    }
}

/// Street provider wrapper that memoizes graph handles.
///
/// Walking queries pass straight through; only `walking_graph` is cached.
pub struct CachedStreets<P: StreetProvider>
where
    P::Graph: Clone + Send + Sync + 'static,
{
    inner: P,
    graphs: MokaCache<GraphKey, P::Graph>,
    bucket_m: f64,
}

impl<P: StreetProvider> CachedStreets<P>
where
    P::Graph: Clone + Send + Sync + 'static,
{
    pub fn new(inner: P, config: &StreetCacheConfig) -> Self {
        let graphs = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            inner,
            graphs,
            bucket_m: config.bucket_m,
        }
    }

    fn key(&self, center: GeoPoint, radius_m: f64) -> GraphKey {
        let bucket_deg = self.bucket_m / METERS_PER_DEGREE;
        (
            (center.lat() / bucket_deg).round() as i64,
            (center.lon() / bucket_deg).round() as i64,
            radius_m.round() as u64,
        )
    }

    /// Number of cached graph handles.
    pub fn cached_graphs(&self) -> u64 {
        self.graphs.entry_count()
    }
}

impl<P: StreetProvider> StreetProvider for CachedStreets<P>
where
    P::Graph: Clone + Send + Sync + 'static,
{
    type Graph = P::Graph;

    fn walking_graph(&self, center: GeoPoint, radius_m: f64) -> Result<Self::Graph, StreetError> {
        let key = self.key(center, radius_m);

        if let Some(graph) = self.graphs.get(&key) {
            return Ok(graph);
        }

        let graph = self.inner.walking_graph(center, radius_m)?;
        self.graphs.insert(key, graph.clone());
        Ok(graph)
    }

    fn walking_distance_m(
        &self,
        graph: &Self::Graph,
        from: GeoPoint,
        to: GeoPoint,
    ) -> Option<f64> {
        self.inner.walking_distance_m(graph, from, to)
    }

    fn walking_path(
        &self,
        graph: &Self::Graph,
        from: GeoPoint,
        to: GeoPoint,
    ) -> Option<Vec<GeoPoint>> {
        self.inner.walking_path(graph, from, to)
    }

    fn street_name(&self, graph: &Self::Graph, point: GeoPoint) -> Option<String> {
        self.inner.street_name(graph, point)
    }
}
