//! Realtime vehicle providers.
//!
//! A provider delivers live vehicle positions from an external feed. When
//! none is configured the view service projects positions from the
//! schedule instead, so everything here is optional plumbing.

use std::future::Future;

use chrono::DateTime;
use serde::Deserialize;

use crate::domain::{RealtimeVehicle, RouteId, StopId, TripId};

/// Default request timeout for the HTTP vehicle feed.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Error from fetching live vehicle positions.
#[derive(Debug, thiserror::Error)]
pub enum VehicleError {
    #[error("vehicle feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("vehicle feed configuration invalid: {0}")]
    Config(String),
}

/// Capability for listing live vehicle positions.
pub trait VehicleProvider: Send + Sync {
    fn list_vehicles(&self)
    -> impl Future<Output = Result<Vec<RealtimeVehicle>, VehicleError>> + Send;
}

/// Provider that never has vehicles.
///
/// Stands in where no realtime feed is configured; the view service then
/// falls back to the schedule projector.
#[derive(Debug, Clone, Default)]
pub struct NoVehicles;

impl VehicleProvider for NoVehicles {
    async fn list_vehicles(&self) -> Result<Vec<RealtimeVehicle>, VehicleError> {
        Ok(Vec::new())
    }
}

/// Configuration for the HTTP vehicle feed client.
#[derive(Debug, Clone)]
pub struct VehicleFeedConfig {
    /// URL returning the JSON vehicle list.
    pub url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl VehicleFeedConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Wire format of the vehicle feed: `{"vehicles": [...]}` with epoch-second
/// timestamps.
#[derive(Debug, Deserialize)]
struct VehicleFeedResponse {
    vehicles: Vec<VehicleRecord>,
}

#[derive(Debug, Deserialize)]
struct VehicleRecord {
    vehicle_id: Option<String>,
    trip_id: Option<String>,
    route_id: Option<String>,
    lat: f64,
    lon: f64,
    bearing: Option<f64>,
    speed_mps: Option<f64>,
    /// Unix epoch seconds.
    timestamp: Option<i64>,
    stop_id: Option<String>,
}

impl VehicleRecord {
    fn into_domain(self) -> RealtimeVehicle {
        RealtimeVehicle {
            vehicle_id: self.vehicle_id,
            trip_id: self.trip_id.map(TripId::new),
            route_id: self.route_id.map(RouteId::new),
            lat: self.lat,
            lon: self.lon,
            bearing: self.bearing,
            speed_mps: self.speed_mps,
            timestamp: self
                .timestamp
                .and_then(|ts| DateTime::from_timestamp(ts, 0))
                .map(|dt| dt.naive_utc()),
            stop_id: self.stop_id.map(StopId::new),
        }
    }
}

/// HTTP JSON vehicle feed client.
#[derive(Debug, Clone)]
pub struct HttpVehicleProvider {
    http: reqwest::Client,
    url: String,
}

impl HttpVehicleProvider {
    pub fn new(config: VehicleFeedConfig) -> Result<Self, VehicleError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(VehicleError::Http)?;

        if config.url.is_empty() {
            return Err(VehicleError::Config("vehicle feed URL is empty".into()));
        }

        Ok(Self {
            http,
            url: config.url,
        })
    }
}

impl VehicleProvider for HttpVehicleProvider {
    async fn list_vehicles(&self) -> Result<Vec<RealtimeVehicle>, VehicleError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<VehicleFeedResponse>()
            .await?;

        Ok(response
            .vehicles
            .into_iter()
            .map(VehicleRecord::into_domain)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_url_rejected() {
        let result = HttpVehicleProvider::new(VehicleFeedConfig::new(""));
        assert!(matches!(result, Err(VehicleError::Config(_))));
    }

    #[test]
    fn record_maps_to_domain() {
        let json = r#"{
            "vehicles": [
                {
                    "vehicle_id": "bus-42",
                    "trip_id": "T1",
                    "route_id": "R1",
                    "lat": 28.1,
                    "lon": -15.4,
                    "bearing": 90.0,
                    "speed_mps": 8.5,
                    "timestamp": 1767312000,
                    "stop_id": "S9"
                },
                {"lat": 0.0, "lon": 0.0}
            ]
        }"#;

        let parsed: VehicleFeedResponse = serde_json::from_str(json).unwrap();
        let vehicles: Vec<RealtimeVehicle> = parsed
            .vehicles
            .into_iter()
            .map(VehicleRecord::into_domain)
            .collect();

        assert_eq!(vehicles.len(), 2);

        let full = &vehicles[0];
        assert_eq!(full.vehicle_id.as_deref(), Some("bus-42"));
        assert_eq!(full.trip_id, Some(TripId::new("T1")));
        assert_eq!(full.route_id, Some(RouteId::new("R1")));
        assert_eq!(full.bearing, Some(90.0));
        assert!(full.timestamp.is_some());

        let sparse = &vehicles[1];
        assert_eq!(sparse.vehicle_id, None);
        assert_eq!(sparse.trip_id, None);
        assert_eq!(sparse.timestamp, None);
    }

    #[tokio::test]
    async fn no_vehicles_provider_is_empty() {
        let vehicles = NoVehicles.list_vehicles().await.unwrap();
        assert!(vehicles.is_empty());
    }
}
