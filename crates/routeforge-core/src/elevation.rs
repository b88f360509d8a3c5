//! Elevation profile math: path sampling, resampling, gain and per-bucket deltas.

use crate::models::Position;

/// Default number of positions sent to the elevation oracle per route.
pub const DEFAULT_MAX_SAMPLES: usize = 50;

/// Evenly strided subset of `path` with at most roughly `max_points` entries.
///
/// The last point is always included so the profile spans the whole route.
pub fn sample_path(path: &[Position], max_points: usize) -> Vec<Position> {
    let max_points = max_points.max(1);
    if path.len() <= max_points {
        return path.to_vec();
    }
    let step = (path.len() / max_points).max(1);
    let mut sampled: Vec<Position> = path.iter().step_by(step).copied().collect();
    if let Some(last) = path.last() {
        if sampled.last() != Some(last) {
            sampled.push(*last);
        }
    }
    sampled
}

/// Linear resampling of `samples` to exactly `target_len` values.
pub fn interpolate_elevation(samples: &[f64], target_len: usize) -> Vec<f64> {
    if samples.len() == target_len {
        return samples.to_vec();
    }
    match (samples.len(), target_len) {
        (_, 0) | (0, _) => return Vec::new(),
        (1, n) => return vec![samples[0]; n],
        (_, 1) => return vec![samples[0]],
        _ => {}
    }
    let ratio = (samples.len() - 1) as f64 / (target_len - 1) as f64;
    (0..target_len)
        .map(|i| {
            let index = i as f64 * ratio;
            let lower = index.floor() as usize;
            let upper = (index.ceil() as usize).min(samples.len() - 1);
            if lower == upper {
                samples[lower]
            } else {
                let weight = index - lower as f64;
                samples[lower] * (1.0 - weight) + samples[upper] * weight
            }
        })
        .collect()
}

/// Total ascent in whole meters.
pub fn elevation_gain(samples: &[f64]) -> f64 {
    samples
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .filter(|diff| *diff > 0.0)
        .sum::<f64>()
        .round()
}

/// Elevation change across each of `ceil(distance)` buckets, rounded to whole meters.
///
/// Samples are assumed evenly spread along the route. The final bucket runs to
/// the last sample; buckets too short to span two samples report zero.
pub fn bucket_elevation_deltas(samples: &[f64], distance: f64) -> Vec<f64> {
    let buckets = bucket_count(distance);
    if buckets == 0 {
        return Vec::new();
    }
    if samples.len() < 2 {
        return placeholder_deltas(buckets);
    }
    let last = samples.len() - 1;
    let per_unit = samples.len() as f64 / distance;
    (0..buckets)
        .map(|i| {
            let start = (i as f64 * per_unit).floor() as usize;
            let end = if i == buckets - 1 {
                last
            } else {
                (((i + 1) as f64 * per_unit).floor() as usize).min(last)
            };
            if start < end {
                (samples[end] - samples[start]).round()
            } else {
                0.0
            }
        })
        .collect()
}

/// Deltas used when no elevation data is available: a flat route.
pub fn placeholder_deltas(buckets: usize) -> Vec<f64> {
    vec![0.0; buckets]
}

/// Number of buckets a route of `distance` units is split into.
pub fn bucket_count(distance: f64) -> usize {
    if !distance.is_finite() || distance <= 0.0 {
        0
    } else {
        distance.ceil() as usize
    }
}
