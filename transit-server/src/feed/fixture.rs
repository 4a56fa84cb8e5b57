//! JSON feed snapshots loaded from disk.
//!
//! The snapshot format is a single JSON document with stops, routes, trips,
//! shapes and connections. It is what the offline timetable pipeline
//! produces; parsing it is ordinary I/O, and the resulting feed is cached
//! for the life of the provider.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::Deserialize;

use crate::domain::{
    Connection, GeoPoint, RouteId, ShapeId, Stop, StopId, TransitFeed, TransitRoute, Trip, TripId,
};

use super::{FeedError, FeedProvider};

#[derive(Debug, Deserialize)]
struct FeedFile {
    stops: Vec<StopRecord>,
    #[serde(default)]
    routes: Vec<RouteRecord>,
    #[serde(default)]
    trips: Vec<TripRecord>,
    #[serde(default)]
    shapes: Vec<ShapeRecord>,
    connections: Vec<ConnectionRecord>,
}

#[derive(Debug, Deserialize)]
struct StopRecord {
    id: String,
    name: String,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct RouteRecord {
    id: String,
    short_name: Option<String>,
    long_name: Option<String>,
    color: Option<String>,
    text_color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TripRecord {
    id: String,
    route_id: Option<String>,
    shape_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShapeRecord {
    id: String,
    points: Vec<PointRecord>,
}

#[derive(Debug, Deserialize)]
struct PointRecord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct ConnectionRecord {
    from: String,
    to: String,
    dep_s: u32,
    arr_s: u32,
    trip: String,
}

/// Feed provider that reads a JSON snapshot from disk.
///
/// The first successful load is cached; later calls return the same
/// `Arc<TransitFeed>`.
pub struct JsonFeedProvider {
    path: PathBuf,
    cached: RwLock<Option<Arc<TransitFeed>>>,
}

impl JsonFeedProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cached: RwLock::new(None),
        }
    }

    fn point(lat: f64, lon: f64, what: &str, id: &str) -> Result<GeoPoint, FeedError> {
        GeoPoint::new(lat, lon)
            .map_err(|e| FeedError::Invalid(format!("{what} {id}: {e}")))
    }

    fn build(file: FeedFile) -> Result<TransitFeed, FeedError> {
        let mut stops = Vec::with_capacity(file.stops.len());
        for s in file.stops {
            stops.push(Stop {
                location: Self::point(s.lat, s.lon, "stop", &s.id)?,
                id: StopId::new(s.id),
                name: s.name,
            });
        }

        let routes = file
            .routes
            .into_iter()
            .map(|r| TransitRoute {
                id: RouteId::new(r.id),
                short_name: r.short_name,
                long_name: r.long_name,
                color: r.color,
                text_color: r.text_color,
            })
            .collect::<Vec<_>>();

        let trips = file
            .trips
            .into_iter()
            .map(|t| Trip {
                id: TripId::new(t.id),
                route: t.route_id.map(RouteId::new),
                shape: t.shape_id.map(ShapeId::new),
            })
            .collect::<Vec<_>>();

        let mut shapes = Vec::with_capacity(file.shapes.len());
        for shape in file.shapes {
            let mut points = Vec::with_capacity(shape.points.len());
            for p in shape.points {
                points.push(Self::point(p.lat, p.lon, "shape", &shape.id)?);
            }
            shapes.push((ShapeId::new(shape.id), points));
        }

        let connections = file
            .connections
            .into_iter()
            .map(|c| Connection {
                dep_stop: StopId::new(c.from),
                arr_stop: StopId::new(c.to),
                dep_time_s: c.dep_s,
                arr_time_s: c.arr_s,
                trip: TripId::new(c.trip),
            })
            .collect::<Vec<_>>();

        Ok(TransitFeed::new(stops, routes, trips, shapes, connections))
    }
}

impl FeedProvider for JsonFeedProvider {
    fn load_feed(&self) -> Result<Arc<TransitFeed>, FeedError> {
        if let Ok(guard) = self.cached.read() {
            if let Some(feed) = guard.as_ref() {
                return Ok(feed.clone());
            }
        }

        let json = std::fs::read_to_string(&self.path)
            .map_err(|e| FeedError::Io(format!("{}: {e}", self.path.display())))?;
        let file: FeedFile = serde_json::from_str(&json)
            .map_err(|e| FeedError::Parse(format!("{}: {e}", self.path.display())))?;
        let feed = Arc::new(Self::build(file)?);

        if let Ok(mut guard) = self.cached.write() {
            *guard = Some(feed.clone());
        }
        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "stops": [
            {"id": "A", "name": "Alpha", "lat": 0.0, "lon": 0.0},
            {"id": "B", "name": "Beta", "lat": 0.0, "lon": 0.01}
        ],
        "routes": [
            {"id": "R1", "short_name": "1", "long_name": "Alpha - Beta", "color": "FF0000"}
        ],
        "trips": [
            {"id": "T1", "route_id": "R1", "shape_id": "S1"}
        ],
        "shapes": [
            {"id": "S1", "points": [{"lat": 0.0, "lon": 0.0}, {"lat": 0.0, "lon": 0.01}]}
        ],
        "connections": [
            {"from": "B", "to": "A", "dep_s": 300, "arr_s": 400, "trip": "T1"},
            {"from": "A", "to": "B", "dep_s": 100, "arr_s": 200, "trip": "T1"}
        ]
    }"#;

    fn write_fixture(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn loads_and_sorts_snapshot() {
        let file = write_fixture(SAMPLE);
        let provider = JsonFeedProvider::new(file.path());

        let feed = provider.load_feed().unwrap();

        assert!(feed.stop(&StopId::new("A")).is_some());
        assert_eq!(
            feed.route(&RouteId::new("R1")).unwrap().short_name,
            Some("1".to_string())
        );
        assert_eq!(feed.trip_shape(&TripId::new("T1")).unwrap().len(), 2);

        // Connections come back in scan order regardless of file order.
        let deps: Vec<u32> = feed.connections().iter().map(|c| c.dep_time_s).collect();
        assert_eq!(deps, vec![100, 300]);
    }

    #[test]
    fn caches_across_calls() {
        let file = write_fixture(SAMPLE);
        let provider = JsonFeedProvider::new(file.path());

        let a = provider.load_feed().unwrap();
        let b = provider.load_feed().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn missing_file_is_io_error() {
        let provider = JsonFeedProvider::new("/nonexistent/feed.json");
        assert!(matches!(provider.load_feed(), Err(FeedError::Io(_))));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let file = write_fixture("{ not json");
        let provider = JsonFeedProvider::new(file.path());
        assert!(matches!(provider.load_feed(), Err(FeedError::Parse(_))));
    }

    #[test]
    fn out_of_range_coordinate_is_invalid() {
        let file = write_fixture(
            r#"{
                "stops": [{"id": "A", "name": "Alpha", "lat": 91.0, "lon": 0.0}],
                "connections": []
            }"#,
        );
        let provider = JsonFeedProvider::new(file.path());
        assert!(matches!(provider.load_feed(), Err(FeedError::Invalid(_))));
    }
}
