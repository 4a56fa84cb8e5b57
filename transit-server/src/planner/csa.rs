//! Connection Scan earliest-arrival search.
//!
//! The scan walks the feed's connections in their stored ascending-departure
//! order exactly once. When connection `c` is examined, every connection with
//! an earlier departure has already been examined, so the best-known arrival
//! at `c`'s departure stop is final with respect to everything that could
//! affect it. A single monotone pass therefore computes true earliest-arrival
//! times for every stop reachable from the seeded stops.

use std::collections::HashMap;

use crate::domain::{Connection, StopId, TransitFeed};

/// Arrival sentinel for stops that were never reached.
pub const UNREACHED: u32 = (1 << 31) - 1;

/// Result of one earliest-arrival scan.
///
/// The arrival map contains the initial seeds plus every improvement found
/// by the scan; stops absent from it are unreached. Predecessors are indices
/// into the feed's connection slice and are only meaningful against the feed
/// the scan ran over.
#[derive(Debug, Clone)]
pub struct CsaResult {
    arrival_by_stop: HashMap<StopId, u32>,
    prev_by_stop: HashMap<StopId, usize>,
}

impl CsaResult {
    /// Best known arrival time at a stop, `None` if unreached.
    pub fn arrival(&self, stop: &StopId) -> Option<u32> {
        self.arrival_by_stop.get(stop).copied()
    }
}

/// Compute earliest arrival times from per-stop seed times.
///
/// `initial` maps stop ids to the earliest moment the rider can be at that
/// stop (seconds since the service day's midnight, walking time and any
/// preference penalty already applied). Stops not present are treated as
/// unreached. Same-stop transfers take zero additional time: a connection is
/// catchable the instant the best arrival at its departure stop equals or
/// precedes its departure.
pub fn earliest_arrival(feed: &TransitFeed, initial: &HashMap<StopId, u32>) -> CsaResult {
    let mut arrival = initial.clone();
    let mut prev: HashMap<StopId, usize> = HashMap::new();

    for (idx, c) in feed.connections().iter().enumerate() {
        let at_departure = arrival.get(&c.dep_stop).copied().unwrap_or(UNREACHED);
        if at_departure > c.dep_time_s {
            continue;
        }

        let at_arrival = arrival.get(&c.arr_stop).copied().unwrap_or(UNREACHED);
        if c.arr_time_s < at_arrival {
            arrival.insert(c.arr_stop.clone(), c.arr_time_s);
            prev.insert(c.arr_stop.clone(), idx);
        }
    }

    CsaResult {
        arrival_by_stop: arrival,
        prev_by_stop: prev,
    }
}

/// Reconstruct the connection chain ending at a destination stop.
///
/// Walks the predecessor map backward until a stop has no predecessor, then
/// reverses. Returns an empty chain if the destination was never reached by
/// a connection; callers must treat that as "no transit path", not as an
/// error.
pub fn reconstruct_connections(
    feed: &TransitFeed,
    result: &CsaResult,
    destination: &StopId,
) -> Vec<Connection> {
    let mut out = Vec::new();
    let mut current = destination.clone();

    while let Some(&idx) = result.prev_by_stop.get(&current) {
        let c = &feed.connections()[idx];
        out.push(c.clone());
        current = c.dep_stop.clone();
    }

    out.reverse();
    out
}
