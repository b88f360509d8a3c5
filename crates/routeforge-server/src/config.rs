//! Server configuration from environment.

use routeforge_oracles::{DEFAULT_ELEVATION_URL, DEFAULT_GEOCODING_URL, DEFAULT_ROUTING_URL};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub routing_url: String,
    /// OSRM profile segment, e.g. `foot` or `bike`.
    pub routing_profile: String,
    pub geocoding_url: String,
    pub elevation_url: String,
    pub persistence_url: String,
    pub persistence_token: Option<String>,
    pub gpx_url: String,
    pub request_timeout_s: u64,
    /// How long a network operation may run before the recalculating flag shows.
    pub recalc_delay_ms: u64,
    pub elevation_cache_ttl_s: u64,
    pub elevation_cache_max_entries: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: parse_var("ROUTEFORGE_PORT", 3000),
            routing_url: string_var("ROUTEFORGE_ROUTING_URL", DEFAULT_ROUTING_URL),
            routing_profile: string_var("ROUTEFORGE_ROUTING_PROFILE", "foot"),
            geocoding_url: string_var("ROUTEFORGE_GEOCODING_URL", DEFAULT_GEOCODING_URL),
            elevation_url: string_var("ROUTEFORGE_ELEVATION_URL", DEFAULT_ELEVATION_URL),
            persistence_url: string_var("ROUTEFORGE_PERSISTENCE_URL", "http://localhost:8000"),
            persistence_token: env::var("ROUTEFORGE_PERSISTENCE_TOKEN")
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            gpx_url: string_var("ROUTEFORGE_GPX_URL", "http://localhost:8000"),
            request_timeout_s: parse_var("ROUTEFORGE_REQUEST_TIMEOUT_S", 10),
            recalc_delay_ms: parse_var("ROUTEFORGE_RECALC_DELAY_MS", 500),
            elevation_cache_ttl_s: parse_var("ROUTEFORGE_ELEVATION_CACHE_TTL_S", 3600),
            elevation_cache_max_entries: parse_var("ROUTEFORGE_ELEVATION_CACHE_MAX_ENTRIES", 50_000),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_s.max(1))
    }

    pub fn recalc_delay(&self) -> Duration {
        Duration::from_millis(self.recalc_delay_ms)
    }

    pub fn elevation_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.elevation_cache_ttl_s.max(30))
    }
}

fn string_var(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
