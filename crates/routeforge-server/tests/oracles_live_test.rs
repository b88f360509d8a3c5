//! Live oracle integration tests.
//!
//! Run with: cargo test --test oracles_live_test -- --ignored
//! Requires network access to the public OSRM, Nominatim and Open-Elevation
//! instances (or the ones named by the ROUTEFORGE_* variables).

use routeforge_core::{ElevationSource, Position, SegmentResolver};
use routeforge_oracles::{
    ElevationCache, NominatimClient, OpenElevationClient, OsrmResolver, DEFAULT_ELEVATION_URL,
    DEFAULT_GEOCODING_URL, DEFAULT_ROUTING_URL,
};
use routeforge_server::session::RouteSession;
use std::sync::Arc;
use std::time::Duration;

fn url(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

fn resolver() -> OsrmResolver {
    OsrmResolver::new(
        url("ROUTEFORGE_ROUTING_URL", DEFAULT_ROUTING_URL),
        "foot",
        Duration::from_secs(15),
    )
}

fn elevation() -> OpenElevationClient {
    OpenElevationClient::new(
        url("ROUTEFORGE_ELEVATION_URL", DEFAULT_ELEVATION_URL),
        Duration::from_secs(15),
        Arc::new(ElevationCache::default()),
    )
}

#[tokio::test]
#[ignore]
async fn test_osrm_resolves_city_segment() {
    let from = Position::new(48.8584, 2.2945);
    let to = Position::new(48.8606, 2.3376);
    let path = resolver().resolve(from, to).await.expect("route");
    assert!(path.len() > 2);
    assert!(path[0].near(&from, 0.01));
    assert!(path[path.len() - 1].near(&to, 0.01));
}

#[tokio::test]
#[ignore]
async fn test_elevation_lookup_is_cached() {
    let client = elevation();
    let points = [Position::new(46.5197, 6.6323), Position::new(46.5210, 6.6350)];
    let first = client.lookup(&points).await.expect("elevations");
    assert_eq!(first.len(), 2);
    assert_eq!(client.cache().len(), 2);
    let second = client.lookup(&points).await.expect("cached elevations");
    assert_eq!(first, second);
}

#[tokio::test]
#[ignore]
async fn test_nominatim_search_and_reverse() {
    let client = NominatimClient::new(
        url("ROUTEFORGE_GEOCODING_URL", DEFAULT_GEOCODING_URL),
        Duration::from_secs(15),
    );
    let places = client.search("Golden Gate Park", 1).await.expect("search");
    assert_eq!(places.len(), 1);
    let name = client.reverse(places[0].position).await.expect("reverse");
    assert!(!name.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_session_end_to_end_against_live_services() {
    let session = RouteSession::new(resolver(), elevation(), Duration::from_millis(500));
    session.append(Position::new(37.7694, -122.4862)).await.unwrap();
    session.append(Position::new(37.7712, -122.4743)).await.unwrap();
    let snapshot = session.append(Position::new(37.7702, -122.4631)).await.unwrap();
    assert_eq!(snapshot.segment_count, 2);
    assert!(snapshot.distance_km > 1.5);

    let report = session.activity(Some(1)).await;
    assert_eq!(report.buckets.len(), snapshot.distance_km.ceil() as usize);
}
