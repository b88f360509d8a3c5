//! JSON API for the route editing session.

mod error;
pub mod request_id;
mod routes;

pub use error::ApiError;

use crate::state::AppState;
use axum::Router;
use routeforge_core::{ElevationSource, SegmentResolver};
use std::sync::Arc;

pub fn routes<R, E>() -> Router<Arc<AppState<R, E>>>
where
    R: SegmentResolver + 'static,
    E: ElevationSource + 'static,
{
    routes::create_router()
}
