//! Multimodal trip search.
//!
//! Composes walk access, a transit ride found by the connection scan, and
//! walk egress into one itinerary. Whenever no feasible combination exists
//! the planner degrades to a single walking leg instead of failing, so a
//! request always gets a usable itinerary.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDateTime, TimeDelta};
use tracing::debug;

use crate::domain::{
    Connection, GeoPoint, Itinerary, RouteLeg, RoutingError, Stop, StopId, TransitFeed,
    TransitLine, TravelMode, haversine_distance_m, polyline_distance_m, seconds_since_midnight,
    service_datetime,
};
use crate::feed::{FeedError, FeedProvider};
use crate::streets::{StreetError, StreetProvider};

use super::candidates::candidate_stops;
use super::config::{Preference, RoutingConfig};
use super::csa::{earliest_arrival, reconstruct_connections};
use super::geometry::slice_polyline_between;

/// Error from route calculation.
///
/// Note that [`RoutingError::NoPathFound`] never appears here: it is always
/// recovered into the walk-only fallback. Only collaborator failures that
/// leave the planner without a street graph or a feed escalate.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Streets(#[from] StreetError),

    #[error(transparent)]
    Feed(#[from] FeedError),
}

/// Walk + transit planner.
///
/// Holds the feed and street capabilities plus tuning knobs; each
/// `calculate_route` call is independent, side-effect-free and safe to run
/// concurrently with any other call.
pub struct MultimodalPlanner<S: StreetProvider> {
    feeds: Arc<dyn FeedProvider>,
    streets: S,
    config: RoutingConfig,
}

impl<S: StreetProvider> MultimodalPlanner<S> {
    pub fn new(feeds: Arc<dyn FeedProvider>, streets: S, config: RoutingConfig) -> Self {
        Self {
            feeds,
            streets,
            config,
        }
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Produce the best itinerary for a request.
    ///
    /// `depart_at` is interpreted as local service time; its calendar day
    /// anchors all timetable offsets. Falls back to a walk-only itinerary
    /// whenever no transit solution exists.
    pub fn calculate_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        depart_at: NaiveDateTime,
        preference: Preference,
    ) -> Result<Itinerary, PlanError> {
        let feed = self.feeds.load_feed()?;

        let center = origin.midpoint(&destination);
        let graph = self
            .streets
            .walking_graph(center, self.config.street_graph_radius_m)?;

        let origin_street = self.streets.street_name(&graph, origin);
        let destination_street = self.streets.street_name(&graph, destination);

        match self.route_via_transit(
            &feed,
            &graph,
            origin,
            destination,
            depart_at,
            preference,
            origin_street.as_deref(),
            destination_street.as_deref(),
        ) {
            Ok(itinerary) => Ok(itinerary),
            Err(RoutingError::NoPathFound(reason)) => {
                debug!(reason, "no transit path, returning walk-only itinerary");
                Ok(self.walking_only(
                    &graph,
                    origin,
                    destination,
                    origin_street,
                    destination_street,
                ))
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn route_via_transit(
        &self,
        feed: &TransitFeed,
        graph: &S::Graph,
        origin: GeoPoint,
        destination: GeoPoint,
        depart_at: NaiveDateTime,
        preference: Preference,
        origin_street: Option<&str>,
        destination_street: Option<&str>,
    ) -> Result<Itinerary, RoutingError> {
        let config = &self.config;

        // Candidate stops for access and egress.
        let origin_candidates = candidate_stops(
            feed,
            origin,
            config.candidate_radius_m,
            config.max_candidate_stops,
        );
        let dest_candidates = candidate_stops(
            feed,
            destination,
            config.candidate_radius_m,
            config.max_candidate_stops,
        );

        if origin_candidates.is_empty() || dest_candidates.is_empty() {
            return Err(RoutingError::NoPathFound(
                "no stops near origin or destination",
            ));
        }

        // Seed times: departure + access walk (+ preference penalty).
        // Candidates the street provider cannot answer for are skipped.
        let depart_s = seconds_since_midnight(depart_at);
        let penalty_s_per_m = config.penalty_s_per_m(preference);

        let mut initial: HashMap<StopId, u32> = HashMap::new();
        let mut origin_walk: HashMap<StopId, (f64, f64)> = HashMap::new();
        for stop in &origin_candidates {
            let Some(dist_m) = self.streets.walking_distance_m(graph, origin, stop.location)
            else {
                continue;
            };
            let dur_s = dist_m / config.walk_speed_mps;
            let penalty_s = dist_m * penalty_s_per_m;
            initial.insert(
                stop.id.clone(),
                (f64::from(depart_s) + dur_s + penalty_s) as u32,
            );
            origin_walk.insert(stop.id.clone(), (dist_m, dur_s));
        }

        if initial.is_empty() {
            return Err(RoutingError::NoPathFound(
                "no walkable access to any nearby stop",
            ));
        }

        let result = earliest_arrival(feed, &initial);

        // Best egress stop by total cost (arrival + egress walk + penalty).
        // Candidates are evaluated in ascending-distance order and the
        // comparison is strict, so the first-seen candidate wins exact ties.
        let mut best: Option<(f64, &Stop, f64, f64)> = None;
        for stop in &dest_candidates {
            let Some(arr_s) = result.arrival(&stop.id) else {
                continue;
            };
            let Some(dist_m) = self
                .streets
                .walking_distance_m(graph, stop.location, destination)
            else {
                continue;
            };

            let dur_s = dist_m / config.walk_speed_mps;
            let penalty_s = dist_m * penalty_s_per_m;
            let cost = f64::from(arr_s) + dur_s + penalty_s;

            if best.is_none_or(|(best_cost, _, _, _)| cost < best_cost) {
                best = Some((cost, stop, dist_m, dur_s));
            }
        }

        let Some((_, dest_stop, dest_walk_m, dest_walk_s)) = best else {
            return Err(RoutingError::NoPathFound(
                "no reachable stop near the destination",
            ));
        };

        let connections = reconstruct_connections(feed, &result, &dest_stop.id);
        if connections.is_empty() {
            // Reached by seed alone; that is not a transit itinerary.
            return Err(RoutingError::NoPathFound("no transit segment found"));
        }

        let boarding_stop = feed
            .stop(&connections[0].dep_stop)
            .ok_or(RoutingError::NoPathFound(
                "boarding stop missing from feed",
            ))?;

        let mut legs: Vec<RouteLeg> = Vec::new();

        // Access walk.
        let (o_walk_m, o_walk_s) = match origin_walk.get(&boarding_stop.id) {
            Some(&(m, s)) => (m, s),
            None => {
                // Should be seeded; recompute defensively.
                let m = self
                    .streets
                    .walking_distance_m(graph, origin, boarding_stop.location)
                    .ok_or(RoutingError::NoPathFound(
                        "no walk segment to the boarding stop",
                    ))?;
                (m, m / config.walk_speed_mps)
            }
        };

        let mut walk1 = RouteLeg::new(TravelMode::Walk, origin, boarding_stop.location);
        walk1.origin_name = origin_street.map(str::to_owned);
        walk1.destination_name = Some(boarding_stop.name.clone());
        walk1.destination_stop_id = Some(boarding_stop.id.clone());
        walk1.depart_at = Some(depart_at);
        walk1.arrive_at = Some(depart_at + seconds_delta(o_walk_s));
        walk1.distance_m = Some(o_walk_m);
        walk1.duration_s = Some(o_walk_s);
        walk1.path = self
            .streets
            .walking_path(graph, origin, boarding_stop.location)
            .unwrap_or_else(|| vec![origin, boarding_stop.location]);
        legs.push(walk1);

        // One transit leg per maximal run of connections on the same trip;
        // a trip change is a transfer even at the same physical stop.
        for group in group_by_trip(&connections) {
            legs.push(self.transit_leg(feed, group, depart_at)?);
        }

        // Egress walk.
        let last_arrive = legs
            .iter()
            .rev()
            .find_map(|leg| leg.arrive_at)
            .unwrap_or(depart_at);

        let mut walk2 = RouteLeg::new(TravelMode::Walk, dest_stop.location, destination);
        walk2.origin_name = Some(dest_stop.name.clone());
        walk2.destination_name = destination_street.map(str::to_owned);
        walk2.origin_stop_id = Some(dest_stop.id.clone());
        walk2.depart_at = Some(last_arrive);
        walk2.arrive_at = Some(last_arrive + seconds_delta(dest_walk_s));
        walk2.distance_m = Some(dest_walk_m);
        walk2.duration_s = Some(dest_walk_s);
        walk2.path = self
            .streets
            .walking_path(graph, dest_stop.location, destination)
            .unwrap_or_else(|| vec![dest_stop.location, destination]);
        legs.push(walk2);

        Ok(Itinerary {
            origin,
            destination,
            legs,
        })
    }

    /// Build one transit leg from a run of same-trip connections.
    fn transit_leg(
        &self,
        feed: &TransitFeed,
        group: &[Connection],
        depart_at: NaiveDateTime,
    ) -> Result<RouteLeg, RoutingError> {
        let first = &group[0];
        let last = &group[group.len() - 1];
        let trip_id = first.trip.clone();

        let boarded = feed.stop(&first.dep_stop).ok_or(RoutingError::NoPathFound(
            "connection references unknown stop",
        ))?;
        let alighted = feed.stop(&last.arr_stop).ok_or(RoutingError::NoPathFound(
            "connection references unknown stop",
        ))?;

        // Ordered, de-duplicated stop sequence for this run.
        let mut stops_seq: Vec<Stop> = Vec::with_capacity(group.len() + 1);
        let mut seen: std::collections::HashSet<StopId> = std::collections::HashSet::new();
        let stop_ids = std::iter::once(&first.dep_stop).chain(group.iter().map(|c| &c.arr_stop));
        for stop_id in stop_ids {
            if !seen.insert(stop_id.clone()) {
                continue;
            }
            if let Some(stop) = feed.stop(stop_id) {
                stops_seq.push(stop.clone());
            }
        }

        // Geometry: shape slice, then stop-to-stop polyline, then a straight
        // segment.
        let mut path: Vec<GeoPoint> = Vec::new();
        if let Some(shape) = feed.trip_shape(&trip_id) {
            if shape.len() >= 2 {
                path = slice_polyline_between(shape, boarded.location, alighted.location);
            }
        }
        if path.is_empty() && stops_seq.len() >= 2 {
            path = stops_seq.iter().map(|s| s.location).collect();
        }
        if path.is_empty() {
            path = vec![boarded.location, alighted.location];
        }

        let trip = feed.trip(&trip_id);
        let route = feed.trip_route(&trip_id);
        let line = TransitLine {
            route_id: route
                .map(|r| r.id.clone())
                .or_else(|| trip.and_then(|t| t.route.clone())),
            short_name: route.and_then(|r| r.short_name.clone()),
            long_name: route.and_then(|r| r.long_name.clone()),
            color: route.and_then(|r| r.color.clone()),
            text_color: route.and_then(|r| r.text_color.clone()),
        };

        let mut leg = RouteLeg::new(TravelMode::Bus, boarded.location, alighted.location);
        leg.origin_name = Some(boarded.name.clone());
        leg.destination_name = Some(alighted.name.clone());
        leg.origin_stop_id = Some(boarded.id.clone());
        leg.destination_stop_id = Some(alighted.id.clone());
        leg.depart_at = Some(service_datetime(depart_at, first.dep_time_s));
        leg.arrive_at = Some(service_datetime(depart_at, last.arr_time_s));
        leg.distance_m = Some(polyline_distance_m(&path));
        leg.duration_s = Some(f64::from(last.arr_time_s.saturating_sub(first.dep_time_s)));
        leg.stops = stops_seq;
        leg.path = path;
        leg.line = Some(line);
        leg.trip_id = Some(trip_id);
        Ok(leg)
    }

    /// The guaranteed fallback: one walking leg door to door.
    ///
    /// Timestamps anchor at "now": there is no timetable involved, the
    /// walk starts whenever the rider does.
    fn walking_only(
        &self,
        graph: &S::Graph,
        origin: GeoPoint,
        destination: GeoPoint,
        origin_street: Option<String>,
        destination_street: Option<String>,
    ) -> Itinerary {
        let dist_m = self
            .streets
            .walking_distance_m(graph, origin, destination)
            .unwrap_or_else(|| haversine_distance_m(origin, destination));
        let dur_s = dist_m / self.config.walk_speed_mps;

        let depart_at = chrono::Local::now().naive_local();

        let mut leg = RouteLeg::new(TravelMode::Walk, origin, destination);
        leg.origin_name = origin_street;
        leg.destination_name = destination_street;
        leg.depart_at = Some(depart_at);
        leg.arrive_at = Some(depart_at + seconds_delta(dur_s));
        leg.distance_m = Some(dist_m);
        leg.duration_s = Some(dur_s);
        leg.path = self
            .streets
            .walking_path(graph, origin, destination)
            .unwrap_or_else(|| vec![origin, destination]);

        Itinerary {
            origin,
            destination,
            legs: vec![leg],
        }
    }
}

/// Fractional seconds as a chrono delta.
fn seconds_delta(seconds: f64) -> TimeDelta {
    TimeDelta::milliseconds((seconds * 1_000.0) as i64)
}

/// Split a connection chain into maximal runs sharing one trip id.
fn group_by_trip(connections: &[Connection]) -> Vec<&[Connection]> {
    let mut groups = Vec::new();
    let mut start = 0;
    for i in 1..connections.len() {
        if connections[i].trip != connections[start].trip {
            groups.push(&connections[start..i]);
            start = i;
        }
    }
    if start < connections.len() {
        groups.push(&connections[start..]);
    }
    groups
}
