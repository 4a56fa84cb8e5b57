//! Realtime map view queries.
//!
//! Backs the live map: the list of transit lines, a representative shape
//! per line, and current vehicle positions: live when a provider is
//! configured, schedule-derived otherwise.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::warn;

use crate::domain::{
    GeoPoint, RealtimeVehicle, RouteId, TransitRoute, seconds_since_midnight,
};
use crate::feed::{FeedError, FeedProvider};

use super::projector::project_vehicles;
use super::provider::VehicleProvider;

/// Read-only services for the realtime map.
pub struct RealtimeViewService<V> {
    feeds: Arc<dyn FeedProvider>,
    vehicles: Option<V>,
}

impl<V: VehicleProvider> RealtimeViewService<V> {
    pub fn new(feeds: Arc<dyn FeedProvider>, vehicles: Option<V>) -> Self {
        Self { feeds, vehicles }
    }

    /// All transit routes, sorted by `(short_name, long_name, route_id)`.
    pub fn list_routes(&self) -> Result<Vec<TransitRoute>, FeedError> {
        let feed = self.feeds.load_feed()?;

        let mut routes: Vec<TransitRoute> = feed.routes().cloned().collect();
        routes.sort_by(|a, b| {
            (a.short_name.as_deref().unwrap_or(""))
                .cmp(b.short_name.as_deref().unwrap_or(""))
                .then_with(|| {
                    (a.long_name.as_deref().unwrap_or(""))
                        .cmp(b.long_name.as_deref().unwrap_or(""))
                })
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        Ok(routes)
    }

    /// Representative shape polyline for a route.
    ///
    /// Picks the shape used by the most of the route's trips; empty when
    /// no trip of the route references a known shape. Shape-count ties go
    /// to the lexicographically smallest shape id.
    pub fn route_shape(&self, route_id: &RouteId) -> Result<Vec<GeoPoint>, FeedError> {
        let feed = self.feeds.load_feed()?;

        let mut counts: HashMap<&crate::domain::ShapeId, usize> = HashMap::new();
        for trip in feed.trips() {
            if trip.route.as_ref() != Some(route_id) {
                continue;
            }
            let Some(shape_id) = trip.shape.as_ref() else {
                continue;
            };
            if feed.shape(shape_id).is_none() {
                continue;
            }
            *counts.entry(shape_id).or_insert(0) += 1;
        }

        let best = counts.into_iter().max_by(|a, b| {
            a.1.cmp(&b.1)
                .then_with(|| b.0.as_str().cmp(a.0.as_str()))
        });

        Ok(best
            .and_then(|(shape_id, _)| feed.shape(shape_id))
            .map(<[GeoPoint]>::to_vec)
            .unwrap_or_default())
    }

    /// Current vehicle positions, optionally filtered to a set of routes.
    ///
    /// Uses the configured realtime provider when there is one; without a
    /// provider, or when the provider fails, positions are projected
    /// from the schedule at `now`. The route filter is a post-filter on
    /// the output; an empty set means no filtering.
    pub async fn list_vehicles(
        &self,
        now: NaiveDateTime,
        route_ids: Option<&HashSet<RouteId>>,
    ) -> Result<Vec<RealtimeVehicle>, FeedError> {
        let mut vehicles = match &self.vehicles {
            Some(provider) => match provider.list_vehicles().await {
                Ok(vehicles) => vehicles,
                Err(error) => {
                    warn!(%error, "vehicle provider failed, projecting from schedule");
                    self.projected(now)?
                }
            },
            None => self.projected(now)?,
        };

        if let Some(filter) = route_ids {
            if !filter.is_empty() {
                vehicles.retain(|v| v.route_id.as_ref().is_some_and(|r| filter.contains(r)));
            }
        }

        Ok(vehicles)
    }

    fn projected(&self, now: NaiveDateTime) -> Result<Vec<RealtimeVehicle>, FeedError> {
        let feed = self.feeds.load_feed()?;
        Ok(project_vehicles(&feed, seconds_since_midnight(now)))
    }
}
