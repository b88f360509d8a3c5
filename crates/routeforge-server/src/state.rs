//! Shared application state.

use crate::config::Config;
use crate::session::RouteSession;
use routeforge_core::{ElevationSource, SegmentResolver};
use routeforge_oracles::{
    ElevationCache, GpxClient, NominatimClient, OpenElevationClient, OsrmResolver,
    PersistenceClient,
};
use std::sync::{Arc, PoisonError, RwLock};

/// State wired to the live services.
pub type LiveState = AppState<OsrmResolver, OpenElevationClient>;

pub struct AppState<R, E> {
    session: RouteSession<R, E>,
    geocoder: NominatimClient,
    persistence: RwLock<PersistenceClient>,
    gpx: GpxClient,
    config: Config,
}

impl LiveState {
    pub fn from_config(config: Config) -> Self {
        let timeout = config.request_timeout();
        let cache = Arc::new(ElevationCache::new(
            config.elevation_cache_ttl(),
            config.elevation_cache_max_entries,
        ));
        let resolver = OsrmResolver::new(&config.routing_url, &config.routing_profile, timeout);
        let elevation = OpenElevationClient::new(&config.elevation_url, timeout, cache);
        Self::new(resolver, elevation, config)
    }
}

impl<R, E> AppState<R, E>
where
    R: SegmentResolver,
    E: ElevationSource,
{
    pub fn new(resolver: R, elevation: E, config: Config) -> Self {
        let timeout = config.request_timeout();
        Self {
            session: RouteSession::new(resolver, elevation, config.recalc_delay()),
            geocoder: NominatimClient::new(&config.geocoding_url, timeout),
            persistence: RwLock::new(PersistenceClient::new(
                &config.persistence_url,
                config.persistence_token.clone(),
                timeout,
            )),
            gpx: GpxClient::new(&config.gpx_url, timeout),
            config,
        }
    }

    pub fn session(&self) -> &RouteSession<R, E> {
        &self.session
    }

    pub fn geocoder(&self) -> &NominatimClient {
        &self.geocoder
    }

    pub fn gpx(&self) -> &GpxClient {
        &self.gpx
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Persistence client for one request, optionally with a caller-supplied token.
    pub fn persistence(&self, token: Option<String>) -> PersistenceClient {
        let mut client = self
            .persistence
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if token.is_some() {
            client.set_token(token);
        }
        client
    }

    /// Drops the configured token after the service rejected it.
    pub fn invalidate_persistence_token(&self) {
        tracing::warn!("Persistence token rejected, signing out");
        self.persistence
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set_token(None);
    }
}
