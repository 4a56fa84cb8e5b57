//! Per-call geometry cache for the projector.
//!
//! Nearest-vertex projections and cumulative arc lengths are recomputed for
//! every trip that shares a shape. One projection call can cover many such
//! trips, so the results are memoized, but only for the duration of that
//! call. The cache is created on the stack and dropped with it, never
//! shared across calls, so a feed reload can never serve stale indices.

use std::collections::HashMap;

use crate::domain::{GeoPoint, ShapeId, StopId, haversine_distance_m};
use crate::planner::nearest_vertex;

/// Memoized shape lookups scoped to one projection call.
#[derive(Default)]
pub struct ShapeIndexCache {
    vertex_by_stop: HashMap<(ShapeId, StopId), Option<usize>>,
    cumulative_by_shape: HashMap<ShapeId, Vec<f64>>,
}

impl ShapeIndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the shape vertex nearest to a stop's location.
    pub fn nearest_vertex(
        &mut self,
        shape_id: &ShapeId,
        stop_id: &StopId,
        shape: &[GeoPoint],
        location: GeoPoint,
    ) -> Option<usize> {
        *self
            .vertex_by_stop
            .entry((shape_id.clone(), stop_id.clone()))
            .or_insert_with(|| nearest_vertex(shape, location))
    }

    /// Cumulative arc length at each vertex of a shape, in meters.
    pub fn cumulative_lengths(&mut self, shape_id: &ShapeId, shape: &[GeoPoint]) -> &[f64] {
        self.cumulative_by_shape
            .entry(shape_id.clone())
            .or_insert_with(|| {
                let mut lengths = Vec::with_capacity(shape.len());
                let mut total = 0.0;
                lengths.push(0.0);
                for w in shape.windows(2) {
                    total += haversine_distance_m(w[0], w[1]);
                    lengths.push(total);
                }
                lengths
            })
    }
}
