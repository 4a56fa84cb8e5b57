//! Candidate stop matching.
//!
//! A cheap geographic pre-filter that bridges arbitrary coordinates to
//! timetable stops: great-circle distance, not network distance. The
//! walking provider decides later whether a candidate is actually
//! reachable on foot.

use crate::domain::{GeoPoint, Stop, TransitFeed, haversine_distance_m};

/// Stops within `radius_m` of a point, nearest first, capped at `max_count`.
///
/// Ordering is ascending great-circle distance; exact-distance ties are
/// broken by ascending stop id so the result is deterministic regardless of
/// the feed's map iteration order. Returns an empty list when no stop is in
/// range; callers handle that as the walk-only fallback, not an error.
pub fn candidate_stops(
    feed: &TransitFeed,
    point: GeoPoint,
    radius_m: f64,
    max_count: usize,
) -> Vec<Stop> {
    let mut scored: Vec<(f64, &Stop)> = feed
        .stops()
        .filter_map(|stop| {
            let d = haversine_distance_m(point, stop.location);
            (d <= radius_m).then_some((d, stop))
        })
        .collect();

    scored.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then_with(|| a.1.id.as_str().cmp(b.1.id.as_str()))
    });
    scored.truncate(max_count);

    scored.into_iter().map(|(_, stop)| stop.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StopId;

    fn stop(id: &str, lat: f64, lon: f64) -> Stop {
        Stop {
            id: StopId::new(id),
            name: format!("Stop {id}"),
            location: GeoPoint::new(lat, lon).unwrap(),
        }
    }

    fn feed(stops: Vec<Stop>) -> TransitFeed {
        TransitFeed::new(stops, vec![], vec![], vec![], vec![])
    }

    fn ids(stops: &[Stop]) -> Vec<&str> {
        stops.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn orders_by_ascending_distance() {
        // 0.001 degrees of longitude at the equator is roughly 111 m.
        let feed = feed(vec![
            stop("far", 0.0, 0.003),
            stop("near", 0.0, 0.001),
            stop("mid", 0.0, 0.002),
        ]);

        let point = GeoPoint::new(0.0, 0.0).unwrap();
        let found = candidate_stops(&feed, point, 1_000.0, 10);

        assert_eq!(ids(&found), vec!["near", "mid", "far"]);
    }

    #[test]
    fn respects_radius() {
        let feed = feed(vec![stop("near", 0.0, 0.001), stop("far", 0.0, 0.1)]);

        let point = GeoPoint::new(0.0, 0.0).unwrap();
        let found = candidate_stops(&feed, point, 500.0, 10);

        assert_eq!(ids(&found), vec!["near"]);
    }

    #[test]
    fn respects_max_count() {
        let feed = feed(vec![
            stop("a", 0.0, 0.001),
            stop("b", 0.0, 0.002),
            stop("c", 0.0, 0.003),
        ]);

        let point = GeoPoint::new(0.0, 0.0).unwrap();
        let found = candidate_stops(&feed, point, 10_000.0, 2);

        assert_eq!(ids(&found), vec!["a", "b"]);
    }

    #[test]
    fn empty_when_nothing_in_range() {
        let feed = feed(vec![stop("far", 10.0, 10.0)]);

        let point = GeoPoint::new(0.0, 0.0).unwrap();
        assert!(candidate_stops(&feed, point, 1_500.0, 10).is_empty());
    }

    #[test]
    fn equal_distances_tie_break_by_stop_id() {
        // Two stops symmetric around the query point.
        let feed = feed(vec![stop("b", 0.0, 0.001), stop("a", 0.0, -0.001)]);

        let point = GeoPoint::new(0.0, 0.0).unwrap();
        let found = candidate_stops(&feed, point, 1_000.0, 10);

        assert_eq!(ids(&found), vec!["a", "b"]);
    }
}
