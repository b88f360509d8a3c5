//! Spatial math for path distances and coordinate matching.

use crate::models::Position;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Tolerance used when matching a waypoint against points of an existing path.
pub const JUNCTION_TOLERANCE_DEG: f64 = 1e-4;

/// Great-circle distance between two points in meters (Haversine formula).
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Distance between two positions in meters.
pub fn distance_m(a: &Position, b: &Position) -> f64 {
    haversine_distance(a.lat, a.lon, b.lat, b.lon)
}

/// Total length of a path in kilometers.
pub fn path_distance_km(path: &[Position]) -> f64 {
    path.windows(2)
        .map(|pair| distance_m(&pair[0], &pair[1]))
        .sum::<f64>()
        / 1000.0
}

/// Index of the last point in `path[..=search_end]` lying within `tolerance_deg`
/// of `target`, scanning backwards.
pub fn find_last_near(
    path: &[Position],
    target: &Position,
    search_end: usize,
    tolerance_deg: f64,
) -> Option<usize> {
    if path.is_empty() {
        return None;
    }
    let end = search_end.min(path.len() - 1);
    (0..=end).rev().find(|&idx| path[idx].near(target, tolerance_deg))
}
