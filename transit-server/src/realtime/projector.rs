//! Schedule-derived vehicle positions.
//!
//! When no realtime feed is configured, the live map still shows vehicles:
//! every trip with a connection in progress at "now" gets one position,
//! interpolated along the trip's shape where the shape is usable and along
//! the straight stop-to-stop segment otherwise.

use std::collections::HashMap;

use crate::domain::{
    Connection, GeoPoint, RealtimeVehicle, ShapeId, StopId, TransitFeed, TripId,
    haversine_distance_m,
};

use super::shape_index::ShapeIndexCache;

/// Project one vehicle per trip currently between two stops.
///
/// `now_s` is seconds since the service day's midnight. For each trip the
/// connection with the greatest departure not exceeding now is used: the
/// most recently boarded hop. Trips whose geometry data is inconsistent
/// fall back to straight-line interpolation rather than being guessed at;
/// trips referencing unknown stops are omitted entirely. Output is sorted
/// by trip id so repeated projections are comparable.
pub fn project_vehicles(feed: &TransitFeed, now_s: u32) -> Vec<RealtimeVehicle> {
    // Connections are scanned in ascending departure order, so a plain
    // insert leaves each trip holding its latest boarded hop.
    let mut active: HashMap<TripId, &Connection> = HashMap::new();
    for c in feed.connections() {
        if c.dep_time_s <= now_s && now_s <= c.arr_time_s {
            active.insert(c.trip.clone(), c);
        }
    }

    let mut in_progress: Vec<(&TripId, &&Connection)> = active.iter().collect();
    in_progress.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));

    // Nearest-vertex lookups repeat across trips sharing a shape; the cache
    // lives for this projection call only.
    let mut cache = ShapeIndexCache::new();

    let mut vehicles = Vec::with_capacity(in_progress.len());
    for (trip_id, connection) in in_progress {
        let Some(dep_stop) = feed.stop(&connection.dep_stop) else {
            continue;
        };
        let Some(arr_stop) = feed.stop(&connection.arr_stop) else {
            continue;
        };

        let duration_s = connection.arr_time_s.saturating_sub(connection.dep_time_s);
        let t = if duration_s == 0 {
            0.0
        } else {
            (f64::from(now_s - connection.dep_time_s) / f64::from(duration_s)).clamp(0.0, 1.0)
        };

        let along_shape = feed
            .trip(trip_id)
            .and_then(|trip| trip.shape.as_ref())
            .and_then(|shape_id| {
                let shape = feed.shape(shape_id)?;
                position_along_shape(
                    shape,
                    shape_id,
                    &dep_stop.id,
                    dep_stop.location,
                    &arr_stop.id,
                    arr_stop.location,
                    t,
                    &mut cache,
                )
            });

        let (position, segment_m) = along_shape.unwrap_or_else(|| {
            let position = lerp(dep_stop.location, arr_stop.location, t);
            let segment_m = haversine_distance_m(dep_stop.location, arr_stop.location);
            (position, segment_m)
        });

        let speed_mps = (duration_s > 0).then(|| segment_m / f64::from(duration_s));

        vehicles.push(RealtimeVehicle {
            vehicle_id: None,
            trip_id: Some(trip_id.clone()),
            route_id: feed.trip(trip_id).and_then(|trip| trip.route.clone()),
            lat: position.0,
            lon: position.1,
            bearing: None,
            speed_mps,
            timestamp: None,
            stop_id: Some(arr_stop.id.clone()),
        });
    }

    vehicles
}

/// Interpolate along the shape between the two stops' nearest vertices.
///
/// Usable only when the boarding vertex strictly precedes the alighting
/// vertex; inverted or coincident indices return `None` and the caller
/// keeps the straight-line fallback. Returns the interpolated `(lat, lon)`
/// and the arc length of the traversed shape section.
#[allow(clippy::too_many_arguments)]
fn position_along_shape(
    shape: &[GeoPoint],
    shape_id: &ShapeId,
    dep_stop: &StopId,
    dep_location: GeoPoint,
    arr_stop: &StopId,
    arr_location: GeoPoint,
    t: f64,
    cache: &mut ShapeIndexCache,
) -> Option<((f64, f64), f64)> {
    let i0 = cache.nearest_vertex(shape_id, dep_stop, shape, dep_location)?;
    let i1 = cache.nearest_vertex(shape_id, arr_stop, shape, arr_location)?;
    if i0 >= i1 {
        return None;
    }

    let cumulative = cache.cumulative_lengths(shape_id, shape);
    let start_m = cumulative[i0];
    let end_m = cumulative[i1];
    let segment_m = end_m - start_m;
    if segment_m <= 0.0 {
        return None;
    }

    // Map the target arc length back to a point between two vertices.
    let target_m = start_m + t * segment_m;
    for j in i0..i1 {
        if cumulative[j + 1] >= target_m {
            let piece = cumulative[j + 1] - cumulative[j];
            let f = if piece > 0.0 {
                (target_m - cumulative[j]) / piece
            } else {
                0.0
            };
            return Some((lerp(shape[j], shape[j + 1], f), segment_m));
        }
    }

    Some(((shape[i1].lat(), shape[i1].lon()), segment_m))
}

fn lerp(a: GeoPoint, b: GeoPoint, t: f64) -> (f64, f64) {
    (
        a.lat() + (b.lat() - a.lat()) * t,
        a.lon() + (b.lon() - a.lon()) * t,
    )
}
