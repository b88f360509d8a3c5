//! Turning an externally loaded path into editable waypoints.

use crate::models::Position;

/// Indices into `path` kept as waypoints.
///
/// The first point is always kept, then evenly spaced interior points, then
/// the last point. Long paths keep roughly eight interior samples, short ones
/// roughly four.
pub fn resample_waypoints(path: &[Position]) -> Vec<usize> {
    let len = path.len();
    if len == 0 {
        return Vec::new();
    }
    let step = if len > 10 { len / 8 } else { len / 4 }.max(1);
    let mut indices = vec![0];
    indices.extend((step..len.saturating_sub(1)).step_by(step));
    if len > 1 {
        indices.push(len - 1);
    }
    indices
}
