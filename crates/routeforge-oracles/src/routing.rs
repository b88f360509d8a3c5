//! OSRM directions client.

use crate::http::{build_client, normalize_base};
use reqwest::Client;
use routeforge_core::{Position, SegmentResolver};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_ROUTING_URL: &str = "https://router.project-osrm.org";

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// GeoJSON order: `[lon, lat]`.
    coordinates: Vec<[f64; 2]>,
}

/// Resolves segments against an OSRM `route` service.
#[derive(Debug, Clone)]
pub struct OsrmResolver {
    client: Client,
    base_url: String,
    profile: String,
}

impl OsrmResolver {
    pub fn new(base_url: impl Into<String>, profile: impl Into<String>, timeout: Duration) -> Self {
        Self::with_client(build_client(timeout), base_url, profile)
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        profile: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: normalize_base(base_url),
            profile: profile.into(),
        }
    }

    pub fn route_url(&self, from: Position, to: Position) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url, self.profile, from.lon, from.lat, to.lon, to.lat
        )
    }

    async fn fetch(&self, from: Position, to: Position) -> Result<Vec<Position>, String> {
        let response = self
            .client
            .get(self.route_url(from, to))
            .send()
            .await
            .map_err(|err| err.to_string())?;
        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }
        let body = response.text().await.map_err(|err| err.to_string())?;
        parse_route(&body).ok_or_else(|| "no usable route in response".to_string())
    }
}

impl SegmentResolver for OsrmResolver {
    async fn resolve(&self, from: Position, to: Position) -> Option<Vec<Position>> {
        match self.fetch(from, to).await {
            Ok(points) => {
                tracing::debug!(points = points.len(), "Resolved segment");
                Some(points)
            }
            Err(err) => {
                tracing::warn!("Routing failed, using straight line: {}", err);
                None
            }
        }
    }
}

/// First route's geometry as `[lat, lon]` positions.
///
/// `None` when the body is malformed, has no routes, or fewer than two points.
pub fn parse_route(body: &str) -> Option<Vec<Position>> {
    let response: OsrmResponse = serde_json::from_str(body).ok()?;
    let route = response.routes.into_iter().next()?;
    let points: Vec<Position> = route
        .geometry
        .coordinates
        .into_iter()
        .map(|[lon, lat]| Position::new(lat, lon))
        .filter(Position::is_finite)
        .collect();
    if points.len() < 2 {
        return None;
    }
    Some(points)
}
