//! Realtime vehicle value object.

use chrono::NaiveDateTime;

use super::ids::{RouteId, StopId, TripId};

/// A vehicle position for the live map.
///
/// Produced either by a realtime provider or by the schedule-based
/// projector; created fresh on every call and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeVehicle {
    pub vehicle_id: Option<String>,
    pub trip_id: Option<TripId>,
    pub route_id: Option<RouteId>,
    pub lat: f64,
    pub lon: f64,
    /// Heading in degrees clockwise from north.
    pub bearing: Option<f64>,
    pub speed_mps: Option<f64>,
    pub timestamp: Option<NaiveDateTime>,
    /// Stop the vehicle is currently heading to.
    pub stop_id: Option<StopId>,
}
