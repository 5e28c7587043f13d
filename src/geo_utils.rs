//! # Geographic Utilities
//!
//! Geographic computations used by the track filter and by saved records.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two path points |
//! | [`polyline_length`] | Total length of a path in meters |
//! | [`compute_bounds`] | Bounding box of a path (for fitting the map camera) |
//! | [`compute_center`] | Centroid of a path |
//! | [`simplify_path`] | Douglas-Peucker simplification for thumbnails |
//!
//! ## Example
//!
//! ```rust
//! use walk_tracker::{PathPoint, geo_utils};
//!
//! let path = vec![
//!     PathPoint::new(51.5074, -0.1278),
//!     PathPoint::new(51.50743, -0.1278),
//!     PathPoint::new(51.50746, -0.1278),
//! ];
//!
//! let length = geo_utils::polyline_length(&path);
//! assert!(length > 6.0 && length < 7.0);
//! ```
//!
//! ## Haversine Formula
//!
//! Distances are computed on a sphere of radius [`EARTH_RADIUS_METERS`]:
//!
//! ```text
//! a = sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlon/2)
//! c = 2·atan2(√a, √(1−a))
//! d = R·c
//! ```
//!
//! The radius is fixed at 6 371 000 m rather than the IUGG mean radius used by
//! the `geo` crate, so the acceptance window of the track filter is evaluated
//! against exactly the same distances the platform layer reports.

use geo::{algorithm::simplify::Simplify, Coord, LineString};

use crate::{Bounds, PathPoint};

/// Sphere radius used for every distance in this crate, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two points using the haversine
/// formula.
///
/// # Example
///
/// ```rust
/// use walk_tracker::{PathPoint, geo_utils};
///
/// let a = PathPoint::new(0.0, 0.0);
/// let b = PathPoint::new(0.00003, 0.0);
///
/// let d = geo_utils::haversine_distance(&a, &b);
/// assert!((d - 3.3358).abs() < 0.001);
/// ```
#[inline]
pub fn haversine_distance(p1: &PathPoint, p2: &PathPoint) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let d_lat = (p2.latitude - p1.latitude).to_radians();
    let d_lon = (p2.longitude - p1.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Calculate the total length of a path in meters.
///
/// Sums the haversine distance between consecutive points. Empty or
/// single-point paths return 0.0.
pub fn polyline_length(points: &[PathPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

// =============================================================================
// Bounding Box / Center
// =============================================================================

/// Compute the bounding box of a path.
///
/// Returns `None` for an empty path.
///
/// # Example
///
/// ```rust
/// use walk_tracker::{PathPoint, geo_utils};
///
/// let path = vec![
///     PathPoint::new(51.5000, -0.1300),
///     PathPoint::new(51.5100, -0.1200),
/// ];
///
/// let bounds = geo_utils::compute_bounds(&path).unwrap();
/// assert_eq!(bounds.min_lat, 51.5000);
/// assert_eq!(bounds.max_lng, -0.1200);
/// ```
pub fn compute_bounds(points: &[PathPoint]) -> Option<Bounds> {
    if points.is_empty() {
        return None;
    }

    let mut min_lat = f64::MAX;
    let mut max_lat = f64::MIN;
    let mut min_lng = f64::MAX;
    let mut max_lng = f64::MIN;

    for p in points {
        min_lat = min_lat.min(p.latitude);
        max_lat = max_lat.max(p.latitude);
        min_lng = min_lng.min(p.longitude);
        max_lng = max_lng.max(p.longitude);
    }

    Some(Bounds { min_lat, max_lat, min_lng, max_lng })
}

/// Compute the arithmetic centroid of a path.
///
/// Returns `None` for an empty path. Fine for walking-scale areas; paths
/// crossing the antimeridian will average to the wrong side of the globe.
pub fn compute_center(points: &[PathPoint]) -> Option<PathPoint> {
    if points.is_empty() {
        return None;
    }

    let sum_lat: f64 = points.iter().map(|p| p.latitude).sum();
    let sum_lng: f64 = points.iter().map(|p| p.longitude).sum();
    let n = points.len() as f64;

    Some(PathPoint::new(sum_lat / n, sum_lng / n))
}

// =============================================================================
// Simplification
// =============================================================================

/// Simplify a path with Douglas-Peucker.
///
/// `tolerance_degrees` is in coordinate degrees (0.00001 ≈ 1.1 m). Paths with
/// fewer than three points are returned unchanged. The first and last points
/// are always kept.
pub fn simplify_path(points: &[PathPoint], tolerance_degrees: f64) -> Vec<PathPoint> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let line = LineString::new(
        points
            .iter()
            .map(|p| Coord { x: p.longitude, y: p.latitude })
            .collect(),
    );

    line.simplify(&tolerance_degrees)
        .0
        .iter()
        .map(|c| PathPoint::new(c.y, c.x))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
