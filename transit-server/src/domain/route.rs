//! Itinerary value objects.
//!
//! A search produces one [`Itinerary`]: an ordered list of mode-homogeneous
//! [`RouteLeg`]s. Legs are plain values owned by the caller; most fields are
//! optional because not every leg kind populates them (a plain walking leg
//! has no line, a fallback leg may lack stop ids).

use chrono::NaiveDateTime;

use super::feed::Stop;
use super::geo::GeoPoint;
use super::ids::{RouteId, StopId, TripId};

/// Travel mode of a leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelMode {
    Walk,
    Bus,
}

/// Line metadata attached to a transit leg for rendering.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransitLine {
    pub route_id: Option<RouteId>,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    /// Hex color without '#', per GTFS.
    pub color: Option<String>,
    /// Hex text color without '#', per GTFS.
    pub text_color: Option<String>,
}

/// One segment of an itinerary.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLeg {
    pub mode: TravelMode,
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub origin_name: Option<String>,
    pub destination_name: Option<String>,
    pub origin_stop_id: Option<StopId>,
    pub destination_stop_id: Option<StopId>,
    pub depart_at: Option<NaiveDateTime>,
    pub arrive_at: Option<NaiveDateTime>,
    pub distance_m: Option<f64>,
    pub duration_s: Option<f64>,
    /// Stops visited on a transit leg, boarding stop first.
    pub stops: Vec<Stop>,
    /// Ordered geometry for rendering.
    pub path: Vec<GeoPoint>,
    pub line: Option<TransitLine>,
    /// Trip actually ridden, for transit legs.
    pub trip_id: Option<TripId>,
}

impl RouteLeg {
    /// Leg with only the required fields set.
    pub fn new(mode: TravelMode, origin: GeoPoint, destination: GeoPoint) -> Self {
        Self {
            mode,
            origin,
            destination,
            origin_name: None,
            destination_name: None,
            origin_stop_id: None,
            destination_stop_id: None,
            depart_at: None,
            arrive_at: None,
            distance_m: None,
            duration_s: None,
            stops: Vec::new(),
            path: Vec::new(),
            line: None,
            trip_id: None,
        }
    }
}

/// A complete door-to-door itinerary.
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub legs: Vec<RouteLeg>,
}

impl Itinerary {
    /// Summed leg distance, or `None` if any leg's distance is unknown.
    pub fn total_distance_m(&self) -> Option<f64> {
        self.legs
            .iter()
            .map(|leg| leg.distance_m)
            .sum::<Option<f64>>()
    }

    /// Total duration in seconds.
    ///
    /// Prefers the wall-clock delta between the first known departure and
    /// the last known arrival, which includes waiting and transfer time.
    /// With no timestamps anywhere it falls back to the sum of per-leg
    /// durations (which excludes waiting); `None` if a duration is missing
    /// too.
    pub fn total_duration_s(&self) -> Option<f64> {
        let first_depart = self.legs.iter().find_map(|leg| leg.depart_at);
        let last_arrive = self.legs.iter().rev().find_map(|leg| leg.arrive_at);

        if let (Some(dep), Some(arr)) = (first_depart, last_arrive) {
            let delta = (arr - dep).num_seconds() as f64;
            return Some(delta.max(0.0));
        }

        self.legs
            .iter()
            .map(|leg| leg.duration_s)
            .sum::<Option<f64>>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};

    fn origin() -> GeoPoint {
        GeoPoint::new(0.0, 0.0).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn leg(mode: TravelMode) -> RouteLeg {
        RouteLeg::new(mode, origin(), origin())
    }

    #[test]
    fn total_duration_includes_waiting_when_timestamps_present() {
        // Walk 08:00-08:05, wait, bus 08:15-08:18.
        let mut walk = leg(TravelMode::Walk);
        walk.depart_at = Some(t(8, 0));
        walk.arrive_at = Some(t(8, 5));
        walk.duration_s = Some(300.0);

        let mut bus = leg(TravelMode::Bus);
        bus.depart_at = Some(t(8, 15));
        bus.arrive_at = Some(t(8, 18));
        bus.duration_s = Some(180.0);

        let itinerary = Itinerary {
            origin: origin(),
            destination: origin(),
            legs: vec![walk, bus],
        };

        assert_eq!(itinerary.total_duration_s(), Some(18.0 * 60.0));
    }

    #[test]
    fn total_duration_falls_back_to_sum_without_timestamps() {
        let mut a = leg(TravelMode::Walk);
        a.duration_s = Some(60.0);
        let mut b = leg(TravelMode::Walk);
        b.duration_s = Some(120.0);

        let itinerary = Itinerary {
            origin: origin(),
            destination: origin(),
            legs: vec![a, b],
        };

        assert_eq!(itinerary.total_duration_s(), Some(180.0));
    }

    #[test]
    fn total_duration_none_when_nothing_known() {
        let itinerary = Itinerary {
            origin: origin(),
            destination: origin(),
            legs: vec![leg(TravelMode::Walk)],
        };

        assert_eq!(itinerary.total_duration_s(), None);
    }

    #[test]
    fn total_duration_clamped_non_negative() {
        // Inconsistent timestamps clamp to zero instead of going negative.
        let mut walk = leg(TravelMode::Walk);
        walk.depart_at = Some(t(9, 0));
        walk.arrive_at = Some(t(9, 0) - TimeDelta::minutes(10));

        let itinerary = Itinerary {
            origin: origin(),
            destination: origin(),
            legs: vec![walk],
        };

        assert_eq!(itinerary.total_duration_s(), Some(0.0));
    }

    #[test]
    fn total_distance_requires_all_legs_known() {
        let mut a = leg(TravelMode::Walk);
        a.distance_m = Some(100.0);
        let mut b = leg(TravelMode::Bus);
        b.distance_m = Some(900.0);

        let mut itinerary = Itinerary {
            origin: origin(),
            destination: origin(),
            legs: vec![a, b],
        };
        assert_eq!(itinerary.total_distance_m(), Some(1000.0));

        itinerary.legs[1].distance_m = None;
        assert_eq!(itinerary.total_distance_m(), None);
    }
}
