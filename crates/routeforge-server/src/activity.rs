//! Per-kilometer buckets and summary for the current path.

use routeforge_core::{
    bucket_elevation_deltas, elevation_gain, path_distance_km, simulate, summarize,
    ActivityProfile, KmBucket, Position, RouteSummary, SimulationInput,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ActivityReport {
    pub distance_km: f64,
    /// Sampled elevations along the path; empty when the lookup failed.
    pub elevation_profile: Vec<f64>,
    pub buckets: Vec<KmBucket>,
    pub summary: RouteSummary,
}

/// Simulates the activity for `path`. Missing elevation data yields a flat
/// profile rather than an error.
pub fn build_report(
    path: &[Position],
    profile: &ActivityProfile,
    elevations: Option<&[f64]>,
    seed: Option<u64>,
) -> ActivityReport {
    let distance_km = path_distance_km(path);
    let elevation_profile = elevations.map(<[f64]>::to_vec).unwrap_or_default();
    let deltas = bucket_elevation_deltas(&elevation_profile, distance_km);
    let buckets = simulate(
        &SimulationInput {
            distance_km,
            elevation_deltas: &deltas,
            profile,
        },
        seed,
    );
    let summary = summarize(distance_km, elevation_gain(&elevation_profile), profile, &buckets);
    ActivityReport {
        distance_km,
        elevation_profile,
        buckets,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> Vec<Position> {
        (0..=30).map(|i| Position::new(0.0, i as f64 * 0.001)).collect()
    }

    #[test]
    fn flat_report_without_elevation() {
        let report = build_report(&path(), &ActivityProfile::default(), None, Some(9));
        assert!(report.distance_km > 3.3 && report.distance_km < 3.4);
        assert_eq!(report.buckets.len(), 4);
        assert!(report.elevation_profile.is_empty());
        assert_eq!(report.summary.elevation_gain_m, 0.0);
        assert!(report.buckets.iter().all(|b| b.elevation_delta_m == 0.0));
    }

    #[test]
    fn climbs_show_up_in_buckets_and_gain() {
        let elevations: Vec<f64> = (0..31).map(|i| i as f64 * 2.0).collect();
        let report = build_report(&path(), &ActivityProfile::default(), Some(&elevations), Some(9));
        assert_eq!(report.summary.elevation_gain_m, 60.0);
        assert!(report.buckets[0].elevation_delta_m > 0.0);
    }

    #[test]
    fn empty_path_has_no_buckets() {
        let report = build_report(&[], &ActivityProfile::default(), None, None);
        assert!(report.buckets.is_empty());
        assert_eq!(report.summary.duration_seconds, 0.0);
    }
}
