use super::*;
use routeforge_core::{haversine_distance, NoElevation, StraightLineResolver};
use std::future::Future;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::time::sleep;

const RECALC_DELAY: Duration = Duration::from_millis(500);

/// Resolver with scripted answers: a small northward detour through the
/// midpoint, after a delay chosen per request.
struct ScriptedResolver {
    calls: AtomicUsize,
    fail: bool,
    delay: fn(Position) -> Duration,
}

impl ScriptedResolver {
    fn new(delay: fn(Position) -> Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
            delay,
        }
    }

    fn instant() -> Self {
        Self::new(|_| Duration::ZERO)
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::instant()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn detour(from: Position, to: Position) -> Vec<Position> {
    vec![
        from,
        Position::new((from.lat + to.lat) / 2.0 + 0.001, (from.lon + to.lon) / 2.0),
        to,
    ]
}

impl SegmentResolver for ScriptedResolver {
    fn resolve(
        &self,
        from: Position,
        to: Position,
    ) -> impl Future<Output = Option<Vec<Position>>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = (self.delay)(from);
        let fail = self.fail;
        async move {
            sleep(delay).await;
            if fail {
                None
            } else {
                Some(detour(from, to))
            }
        }
    }
}

fn session(resolver: ScriptedResolver) -> Arc<RouteSession<ScriptedResolver, NoElevation>> {
    Arc::new(RouteSession::new(resolver, NoElevation, RECALC_DELAY))
}

fn p(lat: f64, lon: f64) -> Position {
    Position::new(lat, lon)
}

fn assert_continuous(snapshot: &SessionSnapshot) {
    let n = snapshot.waypoints.len();
    assert_eq!(snapshot.segment_count, n.saturating_sub(1));
    if n > 0 {
        assert_eq!(snapshot.path.first(), Some(&snapshot.waypoints[0].position));
        assert_eq!(snapshot.path.last(), Some(&snapshot.waypoints[n - 1].position));
    } else {
        assert!(snapshot.path.is_empty());
    }
}

#[tokio::test]
async fn each_append_resolves_exactly_one_segment() {
    let session = session(ScriptedResolver::instant());
    let points = [p(0.0, 0.0), p(0.0, 0.01), p(0.01, 0.01), p(0.01, 0.02), p(0.02, 0.02)];

    let first = session.append(points[0]).await.unwrap();
    assert_eq!(first.path, vec![points[0]]);
    assert_eq!(session.resolver.calls(), 0);

    for (i, point) in points.iter().enumerate().skip(1) {
        let snapshot = session.append(*point).await.unwrap();
        assert_eq!(session.resolver.calls(), i);
        assert_continuous(&snapshot);
    }
    // three points per detour, junctions shared
    assert_eq!(session.snapshot().path.len(), 1 + 2 * 4);
}

#[tokio::test]
async fn remove_last_truncates_without_network() {
    let session = session(ScriptedResolver::instant());
    let (a, b, c) = (p(0.0, 0.0), p(0.0, 0.01), p(0.01, 0.01));
    session.append(a).await.unwrap();
    let after_b = session.append(b).await.unwrap();
    session.append(c).await.unwrap();
    assert_eq!(session.resolver.calls(), 2);

    let snapshot = session.remove_last().await;
    assert_eq!(session.resolver.calls(), 2);
    assert_eq!(snapshot.path, after_b.path);
    assert_eq!(snapshot.path, detour(a, b));
    assert_continuous(&snapshot);
}

#[tokio::test]
async fn remove_last_on_looping_route_cuts_at_the_right_junction() {
    let session = session(ScriptedResolver::instant());
    let (a, b) = (p(0.0, 0.0), p(0.0, 0.01));
    session.append(a).await.unwrap();
    session.append(b).await.unwrap();
    let after_a_again = session.append(a).await.unwrap();
    session.append(b).await.unwrap();

    let snapshot = session.remove_last().await;
    assert_eq!(snapshot.path, after_a_again.path);
    assert_eq!(session.resolver.calls(), 3);
}

#[tokio::test]
async fn remove_last_down_to_nothing() {
    let session = session(ScriptedResolver::instant());
    session.append(p(0.0, 0.0)).await.unwrap();
    session.append(p(0.0, 0.01)).await.unwrap();

    let one = session.remove_last().await;
    assert_eq!(one.path, vec![p(0.0, 0.0)]);
    let none = session.remove_last().await;
    assert!(none.path.is_empty());
    let still_none = session.remove_last().await;
    assert!(still_none.waypoints.is_empty());
}

#[tokio::test]
async fn move_to_touches_only_adjacent_segments() {
    let session = session(ScriptedResolver::instant());
    let points = [p(0.0, 0.0), p(0.0, 0.01), p(0.0, 0.02), p(0.0, 0.03)];
    session.load_batch(points.to_vec()).await.unwrap();
    assert_eq!(session.resolver.calls(), 3);
    let untouched = session.lock().layout.segment(2).cloned();

    let moved = session.move_to(1, p(0.005, 0.01)).await.unwrap();
    assert_eq!(session.resolver.calls(), 5);
    assert_eq!(session.lock().layout.segment(2).cloned(), untouched);
    assert_eq!(moved.waypoints[1].position, p(0.005, 0.01));
    assert_continuous(&moved);

    session.move_to(0, p(-0.001, 0.0)).await.unwrap();
    assert_eq!(session.resolver.calls(), 6);
}

#[tokio::test]
async fn failed_resolution_falls_back_to_straight_line() {
    let session = session(ScriptedResolver::failing());
    session.append(p(1.0, 1.0)).await.unwrap();
    let snapshot = session.append(p(1.0, 1.01)).await.unwrap();
    assert_eq!(snapshot.path, vec![p(1.0, 1.0), p(1.0, 1.01)]);
    assert_eq!(snapshot.pending_segments, 0);
}

#[tokio::test]
async fn straight_line_route_along_the_equator() {
    let session = Arc::new(RouteSession::new(StraightLineResolver, NoElevation, RECALC_DELAY));
    let points = [p(0.0, 0.0), p(0.0, 0.01), p(0.0, 0.02)];
    for point in points {
        session.append(point).await.unwrap();
    }
    let snapshot = session.snapshot();
    assert_eq!(snapshot.path, points.to_vec());
    let expected_km = 2.0 * haversine_distance(0.0, 0.0, 0.0, 0.01) / 1000.0;
    assert!((snapshot.distance_km - expected_km).abs() < 1e-9);
}

#[tokio::test]
async fn invalid_indices_leave_state_untouched() {
    let session = session(ScriptedResolver::instant());
    session.load_batch(vec![p(0.0, 0.0), p(0.0, 0.01)]).await.unwrap();
    let before = session.snapshot();

    assert_eq!(
        session.delete_at(5).await.unwrap_err(),
        StoreError::IndexOutOfRange { index: 5, len: 2 }
    );
    assert!(session.move_to(2, p(1.0, 1.0)).await.is_err());
    assert!(session.drag_preview(9, p(1.0, 1.0)).is_err());

    let after = session.snapshot();
    assert_eq!(after.path, before.path);
    assert_eq!(after.generation, before.generation);
}

#[tokio::test]
async fn delete_rebuilds_and_single_waypoint_clears() {
    let session = session(ScriptedResolver::instant());
    session
        .load_batch(vec![p(0.0, 0.0), p(0.0, 0.01), p(0.0, 0.02)])
        .await
        .unwrap();
    let snapshot = session.delete_at(1).await.unwrap();
    assert_eq!(session.resolver.calls(), 2 + 1);
    assert_eq!(snapshot.path, detour(p(0.0, 0.0), p(0.0, 0.02)));

    session.delete_at(0).await.unwrap();
    let snapshot = session.delete_at(0).await.unwrap();
    assert!(snapshot.waypoints.is_empty());
    assert!(snapshot.path.is_empty());
}

#[tokio::test]
async fn import_adopts_the_path_without_network() {
    let session = session(ScriptedResolver::instant());
    let path: Vec<Position> = (0..40).map(|i| p(0.0, i as f64 * 0.001)).collect();
    let snapshot = session.import_path(path.clone()).unwrap();
    assert_eq!(snapshot.path, path);
    assert_eq!(session.resolver.calls(), 0);
    assert_continuous(&snapshot);

    // editing after import goes back through the resolver
    let snapshot = session.append(p(0.01, 0.04)).await.unwrap();
    assert_eq!(session.resolver.calls(), 1);
    assert_continuous(&snapshot);
}

#[tokio::test(start_paused = true)]
async fn stale_move_is_discarded_after_clear() {
    let session = session(ScriptedResolver::new(|_| Duration::from_secs(1)));
    session
        .load_batch(vec![p(0.0, 0.0), p(0.0, 0.01)])
        .await
        .unwrap();

    let mover = {
        let session = session.clone();
        tokio::spawn(async move { session.move_to(1, p(0.002, 0.01)).await })
    };
    sleep(Duration::from_millis(10)).await;
    let cleared = session.clear();
    assert!(cleared.path.is_empty());

    let result = mover.await.unwrap().unwrap();
    assert!(result.path.is_empty());
    assert!(result.waypoints.is_empty());
    assert_eq!(session.lock().layout.segment_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn superseded_move_does_not_overwrite_newer_one() {
    // The first move's answer arrives after the second move's.
    let session = session(ScriptedResolver::new(|from| {
        if from.lat > 0.0 {
            Duration::from_millis(100)
        } else {
            Duration::from_millis(50)
        }
    }));
    session
        .load_batch(vec![p(0.0, 0.0), p(0.0, 0.01)])
        .await
        .unwrap();

    let slow = {
        let session = session.clone();
        tokio::spawn(async move { session.move_to(0, p(0.003, 0.0)).await })
    };
    sleep(Duration::from_millis(1)).await;
    let fast = session.move_to(0, p(-0.003, 0.0)).await.unwrap();
    slow.await.unwrap().unwrap();

    let snapshot = session.snapshot();
    assert_eq!(snapshot.path, fast.path);
    assert_eq!(snapshot.path.first(), Some(&p(-0.003, 0.0)));
    assert_continuous(&snapshot);
}

#[tokio::test(start_paused = true)]
async fn fan_out_assembles_by_segment_index() {
    // Later segments answer first.
    let session = session(ScriptedResolver::new(|from| {
        Duration::from_millis(300 - (from.lon * 10_000.0) as u64)
    }));
    let points: Vec<Position> = (0..5).map(|i| p(0.0, i as f64 * 0.005)).collect();
    let snapshot = session.load_batch(points.clone()).await.unwrap();

    let expected = routeforge_core::stitch(
        points
            .windows(2)
            .map(|w| routeforge_core::Segment::from_points(detour(w[0], w[1])))
            .collect::<Vec<_>>()
            .iter(),
    );
    assert_eq!(snapshot.path, expected);
    assert_eq!(session.resolver.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn indicator_only_shows_for_slow_operations() {
    let slow = session(ScriptedResolver::new(|_| Duration::from_secs(2)));
    slow.append(p(0.0, 0.0)).await.unwrap();
    let task = {
        let session = slow.clone();
        tokio::spawn(async move { session.append(p(0.0, 0.01)).await })
    };
    sleep(Duration::from_millis(499)).await;
    assert!(!slow.snapshot().recalculating);
    sleep(Duration::from_millis(2)).await;
    assert!(slow.snapshot().recalculating);
    let done = task.await.unwrap().unwrap();
    assert!(!done.recalculating);
    assert!(!slow.indicator().is_visible());

    let fast = session(ScriptedResolver::new(|_| Duration::from_millis(100)));
    fast.append(p(0.0, 0.0)).await.unwrap();
    fast.append(p(0.0, 0.01)).await.unwrap();
    sleep(Duration::from_secs(1)).await;
    assert!(!fast.indicator().is_visible());
    assert_eq!(fast.indicator().in_flight(), 0);
}

#[tokio::test]
async fn rejected_profile_update_keeps_prior_value() {
    let session = session(ScriptedResolver::instant());
    let update = ProfileUpdate {
        variation_percent: Some("95".into()),
        ..Default::default()
    };
    assert!(session.update_profile(&update).is_err());
    assert_eq!(session.profile(), ActivityProfile::default());
}

#[tokio::test]
async fn activity_uses_placeholder_without_elevation() {
    let session = session(ScriptedResolver::failing());
    session
        .load_batch(vec![p(0.0, 0.0), p(0.0, 0.02)])
        .await
        .unwrap();
    let report = session.activity(Some(5)).await;
    assert_eq!(report.buckets.len(), 3);
    assert!(report.elevation_profile.is_empty());
}
