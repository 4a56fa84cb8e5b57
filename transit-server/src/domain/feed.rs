//! In-memory transit timetable.
//!
//! The feed is the static aggregate every search and projection reads:
//! stops, scheduled connections, route metadata, trips and shape polylines.
//! It is built once by a provider and never mutated afterwards, so it can be
//! shared across concurrent requests behind an `Arc` without locking.

use std::collections::HashMap;

use super::geo::GeoPoint;
use super::ids::{RouteId, ShapeId, StopId, TripId};

/// A transit stop.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub location: GeoPoint,
}

/// One scheduled hop of one trip between two stops.
///
/// Times are service-day seconds and may exceed 86 400 for after-midnight
/// service that still belongs to the same service day.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub dep_stop: StopId,
    pub arr_stop: StopId,
    pub dep_time_s: u32,
    pub arr_time_s: u32,
    pub trip: TripId,
}

/// Transit route (line) metadata, a subset of GTFS `routes.txt`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitRoute {
    pub id: RouteId,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    /// Hex color without '#', per GTFS.
    pub color: Option<String>,
    /// Hex text color without '#', per GTFS.
    pub text_color: Option<String>,
}

impl TransitRoute {
    /// Route with an id and no optional metadata.
    pub fn bare(id: RouteId) -> Self {
        Self {
            id,
            short_name: None,
            long_name: None,
            color: None,
            text_color: None,
        }
    }
}

/// One scheduled trip of a vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub id: TripId,
    pub route: Option<RouteId>,
    pub shape: Option<ShapeId>,
}

/// The immutable timetable aggregate.
///
/// Connections are stored sorted ascending by `(dep_time_s, arr_time_s)`.
/// The earliest-arrival scan depends on that ordering, so [`TransitFeed::new`]
/// re-establishes it no matter what order the loader produced.
#[derive(Debug, Default)]
pub struct TransitFeed {
    stops_by_id: HashMap<StopId, Stop>,
    routes_by_id: HashMap<RouteId, TransitRoute>,
    trips_by_id: HashMap<TripId, Trip>,
    shapes_by_id: HashMap<ShapeId, Vec<GeoPoint>>,
    connections: Vec<Connection>,
}

impl TransitFeed {
    /// Build a feed from loaded parts, sorting connections into scan order.
    ///
    /// Empty shapes are dropped: a shape is defined as a non-empty polyline,
    /// and keeping an empty one would only produce degenerate geometry later.
    pub fn new(
        stops: impl IntoIterator<Item = Stop>,
        routes: impl IntoIterator<Item = TransitRoute>,
        trips: impl IntoIterator<Item = Trip>,
        shapes: impl IntoIterator<Item = (ShapeId, Vec<GeoPoint>)>,
        mut connections: Vec<Connection>,
    ) -> Self {
        connections.sort_by_key(|c| (c.dep_time_s, c.arr_time_s));

        Self {
            stops_by_id: stops.into_iter().map(|s| (s.id.clone(), s)).collect(),
            routes_by_id: routes.into_iter().map(|r| (r.id.clone(), r)).collect(),
            trips_by_id: trips.into_iter().map(|t| (t.id.clone(), t)).collect(),
            shapes_by_id: shapes
                .into_iter()
                .filter(|(_, pts)| !pts.is_empty())
                .collect(),
            connections,
        }
    }

    /// Connections in ascending `(dep_time_s, arr_time_s)` order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn stop(&self, id: &StopId) -> Option<&Stop> {
        self.stops_by_id.get(id)
    }

    pub fn stops(&self) -> impl Iterator<Item = &Stop> {
        self.stops_by_id.values()
    }

    pub fn route(&self, id: &RouteId) -> Option<&TransitRoute> {
        self.routes_by_id.get(id)
    }

    pub fn routes(&self) -> impl Iterator<Item = &TransitRoute> {
        self.routes_by_id.values()
    }

    pub fn trip(&self, id: &TripId) -> Option<&Trip> {
        self.trips_by_id.get(id)
    }

    pub fn trips(&self) -> impl Iterator<Item = &Trip> {
        self.trips_by_id.values()
    }

    pub fn shape(&self, id: &ShapeId) -> Option<&[GeoPoint]> {
        self.shapes_by_id.get(id).map(Vec::as_slice)
    }

    /// Shape polyline for a trip, if the trip references one that exists.
    pub fn trip_shape(&self, trip_id: &TripId) -> Option<&[GeoPoint]> {
        let trip = self.trip(trip_id)?;
        self.shape(trip.shape.as_ref()?)
    }

    /// Route metadata for a trip, if the trip references a known route.
    pub fn trip_route(&self, trip_id: &TripId) -> Option<&TransitRoute> {
        let trip = self.trip(trip_id)?;
        self.route(trip.route.as_ref()?)
    }
}
