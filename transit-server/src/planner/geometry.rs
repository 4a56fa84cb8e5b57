//! Shape polyline slicing.
//!
//! Transit legs render along the trip's planned shape where one exists. The
//! shape covers the whole trip, so the leg's portion is cut out by snapping
//! the boarding and alighting coordinates to their nearest shape vertices.

use crate::domain::{GeoPoint, haversine_distance_m};

/// Index of the polyline vertex nearest to a target point.
///
/// Linear scan; `None` only for an empty polyline.
pub fn nearest_vertex(points: &[GeoPoint], target: GeoPoint) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, p) in points.iter().enumerate() {
        let d = haversine_distance_m(*p, target);
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}

/// Cut the portion of a polyline between two target points.
///
/// Each target snaps to its nearest vertex. If both snap to the same vertex
/// there is no usable sub-path and only the two targets are returned.
/// Otherwise the contiguous vertex run between the two indices is returned
/// (reversed when the end precedes the start), with the first and last
/// points replaced by the exact targets so rendered geometry begins and
/// ends precisely at the leg's stated endpoints.
pub fn slice_polyline_between(points: &[GeoPoint], start: GeoPoint, end: GeoPoint) -> Vec<GeoPoint> {
    if points.len() < 2 {
        return vec![start, end];
    }

    // Non-empty slice, so both lookups succeed.
    let i0 = nearest_vertex(points, start).unwrap_or(0);
    let i1 = nearest_vertex(points, end).unwrap_or(0);

    if i0 == i1 {
        return vec![start, end];
    }

    let mut segment: Vec<GeoPoint> = if i0 < i1 {
        points[i0..=i1].to_vec()
    } else {
        let mut seg = points[i1..=i0].to_vec();
        seg.reverse();
        seg
    };

    let last = segment.len() - 1;
    segment[0] = start;
    segment[last] = end;
    segment
}
