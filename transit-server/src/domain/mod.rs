//! Domain types for the multimodal transit router.
//!
//! This module contains the core model: validated geographic primitives,
//! the immutable timetable aggregate, itinerary value objects and the
//! realtime vehicle. Types enforce their invariants at construction time,
//! so code that receives them can trust their validity.

mod error;
mod feed;
mod geo;
mod ids;
mod realtime;
mod route;
mod time;

pub use error::RoutingError;
pub use feed::{Connection, Stop, TransitFeed, TransitRoute, Trip};
pub use geo::{GeoPoint, InvalidGeoPoint, haversine_distance_m, polyline_distance_m};
pub use ids::{RouteId, ShapeId, StopId, TripId};
pub use realtime::RealtimeVehicle;
pub use route::{Itinerary, RouteLeg, TransitLine, TravelMode};
pub use time::{SECONDS_PER_DAY, seconds_since_midnight, service_datetime};
