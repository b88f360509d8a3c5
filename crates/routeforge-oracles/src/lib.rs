//! Clients for the external services a route editing session talks to.

pub mod cache;
pub mod elevation;
pub mod geocoding;
pub mod gpx;
pub mod http;
pub mod persistence;
pub mod routing;

pub use cache::ElevationCache;
pub use elevation::{OpenElevationClient, DEFAULT_ELEVATION_URL};
pub use geocoding::{GeocodeError, NominatimClient, Place, DEFAULT_GEOCODING_URL};
pub use gpx::{GpxClient, GpxFile, GpxRunDetails};
pub use persistence::{PersistenceClient, PersistenceError, RunDetailsRecord, SavedRoute};
pub use routing::{OsrmResolver, DEFAULT_ROUTING_URL};
