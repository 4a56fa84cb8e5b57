//! Data transfer objects for web requests and responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{
    GeoPoint, Itinerary, RealtimeVehicle, RouteLeg, Stop, TransitLine, TransitRoute, TravelMode,
};
use crate::feed::FeedError;
use crate::jobs::{JobRecord, JobStatus};
use crate::planner::{PlanError, Preference};

/// Timestamp format used on the wire.
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn format_time(dt: NaiveDateTime) -> String {
    dt.format(TIME_FORMAT).to_string()
}

/// Parse a wire timestamp.
pub fn parse_time(s: &str) -> Result<NaiveDateTime, AppError> {
    NaiveDateTime::parse_from_str(s, TIME_FORMAT).map_err(|_| AppError::BadRequest {
        message: format!("invalid timestamp {s:?}, expected {TIME_FORMAT}"),
    })
}

/// A coordinate pair on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPointDto {
    pub lat: f64,
    pub lon: f64,
}

impl From<GeoPoint> for GeoPointDto {
    fn from(p: GeoPoint) -> Self {
        Self {
            lat: p.lat(),
            lon: p.lon(),
        }
    }
}

impl GeoPointDto {
    /// Validate into a domain point.
    pub fn into_domain(self) -> Result<GeoPoint, AppError> {
        GeoPoint::new(self.lat, self.lon).map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })
    }
}

/// Request to calculate a route synchronously, or to submit a job.
#[derive(Debug, Deserialize)]
pub struct CalculateRouteRequest {
    pub origin: GeoPointDto,
    pub destination: GeoPointDto,

    /// Departure timestamp; defaults to now.
    pub depart_at: Option<String>,

    /// Search preference; defaults to `fastest`.
    pub preference: Option<Preference>,
}

/// A stop on a transit leg.
#[derive(Debug, Serialize)]
pub struct StopDto {
    pub stop_id: String,
    pub name: String,
    pub location: GeoPointDto,
}

impl From<&Stop> for StopDto {
    fn from(stop: &Stop) -> Self {
        Self {
            stop_id: stop.id.to_string(),
            name: stop.name.clone(),
            location: stop.location.into(),
        }
    }
}

/// Line metadata on a transit leg.
#[derive(Debug, Serialize)]
pub struct LineDto {
    pub route_id: Option<String>,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub color: Option<String>,
    pub text_color: Option<String>,
}

impl From<&TransitLine> for LineDto {
    fn from(line: &TransitLine) -> Self {
        Self {
            route_id: line.route_id.as_ref().map(ToString::to_string),
            short_name: line.short_name.clone(),
            long_name: line.long_name.clone(),
            color: line.color.clone(),
            text_color: line.text_color.clone(),
        }
    }
}

/// One leg of a returned itinerary.
#[derive(Debug, Serialize)]
pub struct LegDto {
    pub mode: &'static str,
    pub origin: GeoPointDto,
    pub destination: GeoPointDto,
    pub origin_name: Option<String>,
    pub destination_name: Option<String>,
    pub origin_stop_id: Option<String>,
    pub destination_stop_id: Option<String>,
    pub depart_at: Option<String>,
    pub arrive_at: Option<String>,
    pub distance_m: Option<f64>,
    pub duration_s: Option<f64>,
    pub stops: Vec<StopDto>,
    pub path: Vec<GeoPointDto>,
    pub line: Option<LineDto>,
    pub trip_id: Option<String>,
}

impl From<&RouteLeg> for LegDto {
    fn from(leg: &RouteLeg) -> Self {
        Self {
            mode: match leg.mode {
                TravelMode::Walk => "walk",
                TravelMode::Bus => "bus",
            },
            origin: leg.origin.into(),
            destination: leg.destination.into(),
            origin_name: leg.origin_name.clone(),
            destination_name: leg.destination_name.clone(),
            origin_stop_id: leg.origin_stop_id.as_ref().map(ToString::to_string),
            destination_stop_id: leg.destination_stop_id.as_ref().map(ToString::to_string),
            depart_at: leg.depart_at.map(format_time),
            arrive_at: leg.arrive_at.map(format_time),
            distance_m: leg.distance_m,
            duration_s: leg.duration_s,
            stops: leg.stops.iter().map(StopDto::from).collect(),
            path: leg.path.iter().map(|p| GeoPointDto::from(*p)).collect(),
            line: leg.line.as_ref().map(LineDto::from),
            trip_id: leg.trip_id.as_ref().map(ToString::to_string),
        }
    }
}

/// A calculated itinerary.
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub origin: GeoPointDto,
    pub destination: GeoPointDto,
    pub legs: Vec<LegDto>,
    pub total_distance_m: Option<f64>,
    pub total_duration_s: Option<f64>,
}

impl From<&Itinerary> for RouteResponse {
    fn from(itinerary: &Itinerary) -> Self {
        Self {
            origin: itinerary.origin.into(),
            destination: itinerary.destination.into(),
            total_distance_m: itinerary.total_distance_m(),
            total_duration_s: itinerary.total_duration_s(),
            legs: itinerary.legs.iter().map(LegDto::from).collect(),
        }
    }
}

/// Response to a job submission.
#[derive(Debug, Serialize)]
pub struct SubmitJobResponse {
    pub request_id: String,
}

/// Polled job state.
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub request_id: String,
    pub status: &'static str,
    pub result: Option<RouteResponse>,
    pub error: Option<String>,
}

impl From<&JobRecord> for JobStatusResponse {
    fn from(record: &JobRecord) -> Self {
        Self {
            request_id: record.request_id.clone(),
            status: match record.status {
                JobStatus::Pending => "PENDING",
                JobStatus::Success => "SUCCESS",
                JobStatus::Error => "ERROR",
            },
            result: record.result.as_ref().map(RouteResponse::from),
            error: record.error.clone(),
        }
    }
}

/// A transit line for the map legend.
#[derive(Debug, Serialize)]
pub struct TransitRouteDto {
    pub route_id: String,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub color: Option<String>,
    pub text_color: Option<String>,
}

impl From<&TransitRoute> for TransitRouteDto {
    fn from(route: &TransitRoute) -> Self {
        Self {
            route_id: route.id.to_string(),
            short_name: route.short_name.clone(),
            long_name: route.long_name.clone(),
            color: route.color.clone(),
            text_color: route.text_color.clone(),
        }
    }
}

/// Representative polyline for one route.
#[derive(Debug, Serialize)]
pub struct RouteShapeResponse {
    pub route_id: String,
    pub points: Vec<GeoPointDto>,
}

/// Query parameters for the vehicles endpoint.
#[derive(Debug, Deserialize)]
pub struct VehiclesQuery {
    /// Comma-separated route ids to keep; absent means all.
    pub route_id: Option<String>,
}

/// One vehicle on the live map.
#[derive(Debug, Serialize)]
pub struct VehicleDto {
    pub vehicle_id: Option<String>,
    pub trip_id: Option<String>,
    pub route_id: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub bearing: Option<f64>,
    pub speed_mps: Option<f64>,
    pub timestamp: Option<String>,
    pub stop_id: Option<String>,
}

impl From<&RealtimeVehicle> for VehicleDto {
    fn from(v: &RealtimeVehicle) -> Self {
        Self {
            vehicle_id: v.vehicle_id.clone(),
            trip_id: v.trip_id.as_ref().map(ToString::to_string),
            route_id: v.route_id.as_ref().map(ToString::to_string),
            lat: v.lat,
            lon: v.lon,
            bearing: v.bearing,
            speed_mps: v.speed_mps,
            timestamp: v.timestamp.map(format_time),
            stop_id: v.stop_id.as_ref().map(ToString::to_string),
        }
    }
}

/// Vehicle list with its fetch time.
#[derive(Debug, Serialize)]
pub struct VehiclesResponse {
    pub fetched_at: String,
    pub vehicles: Vec<VehicleDto>,
}

/// Error payload.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Web-layer errors mapped to HTTP statuses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Internal { message: String },
}

impl From<PlanError> for AppError {
    fn from(error: PlanError) -> Self {
        Self::Internal {
            message: error.to_string(),
        }
    }
}

impl From<FeedError> for AppError {
    fn from(error: FeedError) -> Self {
        Self::Internal {
            message: error.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
