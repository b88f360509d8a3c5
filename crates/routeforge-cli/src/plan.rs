//! Route resolution and simulation for a fixed waypoint list.

use anyhow::{Context, Result};
use futures::future::join_all;
use routeforge_core::{
    bucket_elevation_deltas, elevation_gain, path_distance_km, sample_path, simulate, summarize,
    ActivityProfile, ElevationSource, KmBucket, Position, RouteLayout, RouteSummary,
    SegmentResolver, SimulationInput, WaypointStore, DEFAULT_MAX_SAMPLES,
};
use serde::Serialize;

/// Everything one simulation run produces.
#[derive(Debug, Clone, Serialize)]
pub struct RoutePlan {
    pub waypoints: Vec<Position>,
    pub path: Vec<Position>,
    /// Segments that fell back to a straight line.
    pub straight_segments: usize,
    pub distance_km: f64,
    pub elevation_profile: Vec<f64>,
    pub buckets: Vec<KmBucket>,
    pub summary: RouteSummary,
}

/// Parses a `lat,lon` argument.
pub fn parse_waypoint(value: &str) -> Result<Position, String> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| format!("expected lat,lon but got '{}'", value))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("invalid latitude '{}'", lat.trim()))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude '{}'", lon.trim()))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(format!("coordinates out of range: {},{}", lat, lon));
    }
    Ok(Position::new(lat, lon))
}

/// Resolves every segment, then simulates the activity over the stitched path.
pub async fn plan_route<R, E>(
    resolver: &R,
    elevation: &E,
    waypoints: Vec<Position>,
    profile: &ActivityProfile,
    seed: Option<u64>,
) -> Result<RoutePlan>
where
    R: SegmentResolver,
    E: ElevationSource,
{
    let store = WaypointStore::from_positions(waypoints).context("invalid waypoint list")?;
    let mut layout = RouteLayout::new();
    let pending = layout.begin_rebuild(&store, 0);

    let answers = join_all(
        pending
            .iter()
            .map(|segment| resolver.resolve(segment.from, segment.to)),
    )
    .await;
    let mut straight_segments = 0;
    for (segment, answer) in pending.iter().zip(answers) {
        if answer.is_none() {
            tracing::warn!(index = segment.index, "No route found, using a straight line");
            straight_segments += 1;
        }
        layout.apply(segment, answer);
    }

    let path = layout.path().to_vec();
    let distance_km = path_distance_km(&path);
    let samples = sample_path(&path, DEFAULT_MAX_SAMPLES);
    let elevation_profile = if samples.len() >= 2 {
        elevation.lookup(&samples).await.unwrap_or_default()
    } else {
        Vec::new()
    };
    if elevation_profile.is_empty() && path.len() >= 2 {
        tracing::info!("No elevation data, simulating a flat route");
    }

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

    Ok(RoutePlan {
        waypoints: store.positions().to_vec(),
        path,
        straight_segments,
        distance_km,
        elevation_profile,
        buckets,
        summary,
    })
}
