//! Nominatim forward and reverse geocoding.

use crate::http::{build_client, normalize_base};
use reqwest::Client;
use routeforge_core::{AddressParts, Position};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_GEOCODING_URL: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("location not found")]
    NotFound,
    #[error("geocoding request failed: {0}")]
    Transport(String),
}

/// A search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub position: Position,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<AddressParts>,
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            base_url: normalize_base(base_url),
        }
    }

    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GeocodeError::NotFound);
        }
        let url = format!("{}/search", self.base_url);
        let limit = limit.max(1).to_string();
        let body = self
            .get_text(&url, &[("format", "json"), ("q", query), ("limit", &limit)])
            .await?;
        let places = parse_search(&body)?;
        if places.is_empty() {
            return Err(GeocodeError::NotFound);
        }
        Ok(places)
    }

    /// Short place name for a position, e.g. `"Valencia Street, Mission"`.
    pub async fn reverse(&self, position: Position) -> Result<String, GeocodeError> {
        let url = format!("{}/reverse", self.base_url);
        let lat = position.lat.to_string();
        let lon = position.lon.to_string();
        let body = self
            .get_text(
                &url,
                &[
                    ("format", "json"),
                    ("lat", &lat),
                    ("lon", &lon),
                    ("zoom", "14"),
                    ("addressdetails", "1"),
                ],
            )
            .await?;
        parse_reverse(&body).ok_or(GeocodeError::NotFound)
    }

    async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, GeocodeError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|err| GeocodeError::Transport(err.to_string()))?;
        if !response.status().is_success() {
            return Err(GeocodeError::Transport(format!("HTTP {}", response.status())));
        }
        response
            .text()
            .await
            .map_err(|err| GeocodeError::Transport(err.to_string()))
    }
}

pub fn parse_search(body: &str) -> Result<Vec<Place>, GeocodeError> {
    let hits: Vec<SearchHit> =
        serde_json::from_str(body).map_err(|err| GeocodeError::Transport(err.to_string()))?;
    Ok(hits
        .into_iter()
        .filter_map(|hit| {
            let lat = hit.lat.parse::<f64>().ok()?;
            let lon = hit.lon.parse::<f64>().ok()?;
            Some(Place {
                position: Position::new(lat, lon),
                display_name: hit.display_name,
            })
        })
        .collect())
}

pub fn parse_reverse(body: &str) -> Option<String> {
    let response: ReverseResponse = serde_json::from_str(body).ok()?;
    response.address?.short_name()
}
