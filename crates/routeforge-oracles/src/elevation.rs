//! Open-Elevation lookups with a shared per-point cache.

use crate::cache::ElevationCache;
use crate::http::{build_client, normalize_base};
use reqwest::Client;
use routeforge_core::{ElevationSource, Position};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_ELEVATION_URL: &str = "https://api.open-elevation.com";

#[derive(Debug, Serialize)]
struct LookupRequest {
    locations: Vec<LookupLocation>,
}

#[derive(Debug, Serialize)]
struct LookupLocation {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    results: Vec<LookupResult>,
}

#[derive(Debug, Deserialize)]
struct LookupResult {
    elevation: f64,
}

#[derive(Debug, Clone)]
pub struct OpenElevationClient {
    client: Client,
    base_url: String,
    cache: Arc<ElevationCache>,
}

impl OpenElevationClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration, cache: Arc<ElevationCache>) -> Self {
        Self {
            client: build_client(timeout),
            base_url: normalize_base(base_url),
            cache,
        }
    }

    pub fn cache(&self) -> &ElevationCache {
        &self.cache
    }

    async fn fetch(&self, positions: &[Position]) -> Result<Vec<f64>, String> {
        let url = format!("{}/api/v1/lookup", self.base_url);
        let request = LookupRequest {
            locations: positions
                .iter()
                .map(|p| LookupLocation {
                    latitude: p.lat,
                    longitude: p.lon,
                })
                .collect(),
        };
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|err| err.to_string())?;
        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }
        let body = response.text().await.map_err(|err| err.to_string())?;
        let elevations = parse_lookup(&body)?;
        if elevations.len() != positions.len() {
            return Err(format!(
                "expected {} elevations, got {}",
                positions.len(),
                elevations.len()
            ));
        }
        Ok(elevations)
    }
}

impl ElevationSource for OpenElevationClient {
    async fn lookup(&self, positions: &[Position]) -> Option<Vec<f64>> {
        if positions.is_empty() {
            return Some(Vec::new());
        }
        let cached: Vec<Option<f64>> = positions.iter().map(|p| self.cache.get(p)).collect();
        let missing: Vec<Position> = positions
            .iter()
            .zip(&cached)
            .filter(|(_, hit)| hit.is_none())
            .map(|(p, _)| *p)
            .collect();

        if missing.is_empty() {
            tracing::debug!(points = positions.len(), "Elevation served from cache");
            return cached.into_iter().collect();
        }

        let fetched = match self.fetch(&missing).await {
            Ok(values) => values,
            Err(err) => {
                tracing::warn!("Elevation lookup failed: {}", err);
                return None;
            }
        };
        for (position, elevation) in missing.iter().zip(&fetched) {
            self.cache.insert(position, *elevation);
        }

        let mut fetched = fetched.into_iter();
        cached
            .into_iter()
            .map(|hit| hit.or_else(|| fetched.next()))
            .collect()
    }
}

pub fn parse_lookup(body: &str) -> Result<Vec<f64>, String> {
    let response: LookupResponse = serde_json::from_str(body).map_err(|err| err.to_string())?;
    Ok(response.results.into_iter().map(|r| r.elevation).collect())
}
