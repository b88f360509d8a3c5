//! REST API routes.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Local;
use routeforge_core::{
    activity_title, ActivityProfile, ElevationSource, Position, ProfileUpdate, SegmentResolver,
};
use routeforge_oracles::{GpxRunDetails, PersistenceError, Place, RunDetailsRecord};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::activity::ActivityReport;
use crate::api::{request_id, ApiError};
use crate::session::SessionSnapshot;
use crate::state::AppState;

type SharedState<R, E> = State<Arc<AppState<R, E>>>;

/// Create the API router.
pub fn create_router<R, E>() -> Router<Arc<AppState<R, E>>>
where
    R: SegmentResolver + 'static,
    E: ElevationSource + 'static,
{
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/v1/session", get(get_session::<R, E>))
        .route(
            "/v1/waypoints",
            post(append_waypoint::<R, E>).delete(clear_waypoints::<R, E>),
        )
        .route("/v1/waypoints/last", delete(remove_last_waypoint::<R, E>))
        .route("/v1/waypoints/batch", post(load_waypoints::<R, E>))
        .route(
            "/v1/waypoints/:index",
            put(move_waypoint::<R, E>).delete(delete_waypoint::<R, E>),
        )
        .route("/v1/waypoints/:index/preview", post(preview_waypoint::<R, E>))
        .route("/v1/route/import", post(import_route::<R, E>))
        .route(
            "/v1/profile",
            get(get_profile::<R, E>).put(update_profile::<R, E>),
        )
        .route("/v1/activity", get(get_activity::<R, E>))
        .route("/v1/search", get(search_location::<R, E>))
        .route("/v1/routes/save", post(save_route::<R, E>))
        .route("/v1/gpx", post(download_gpx::<R, E>))
        .layer(middleware::from_fn(request_id::ensure_request_id))
}

// === Request/Response types ===

#[derive(Debug, Deserialize)]
pub struct PositionRequest {
    /// `[lat, lon]`
    pub position: Position,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub waypoints: Vec<Position>,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub path: Vec<Position>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    /// Fixes the simulation noise; omitted means a fresh seed per request.
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SaveRouteRequest {
    pub name: String,
    #[serde(default)]
    pub overwrite: bool,
    pub seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GpxRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub title: String,
    #[serde(flatten)]
    pub report: ActivityReport,
}

// === Handlers ===

async fn get_session<R, E>(State(state): SharedState<R, E>) -> Json<SessionSnapshot>
where
    R: SegmentResolver + 'static,
    E: ElevationSource + 'static,
{
    Json(state.session().snapshot())
}

async fn append_waypoint<R, E>(
    State(state): SharedState<R, E>,
    Json(req): Json<PositionRequest>,
) -> Result<Json<SessionSnapshot>, ApiError>
where
    R: SegmentResolver + 'static,
    E: ElevationSource + 'static,
{
    Ok(Json(state.session().append(req.position).await?))
}

async fn clear_waypoints<R, E>(State(state): SharedState<R, E>) -> Json<SessionSnapshot>
where
    R: SegmentResolver + 'static,
    E: ElevationSource + 'static,
{
    Json(state.session().clear())
}

async fn remove_last_waypoint<R, E>(State(state): SharedState<R, E>) -> Json<SessionSnapshot>
where
    R: SegmentResolver + 'static,
    E: ElevationSource + 'static,
{
    Json(state.session().remove_last().await)
}

async fn load_waypoints<R, E>(
    State(state): SharedState<R, E>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<SessionSnapshot>, ApiError>
where
    R: SegmentResolver + 'static,
    E: ElevationSource + 'static,
{
    Ok(Json(state.session().load_batch(req.waypoints).await?))
}

async fn move_waypoint<R, E>(
    State(state): SharedState<R, E>,
    Path(index): Path<usize>,
    Json(req): Json<PositionRequest>,
) -> Result<Json<SessionSnapshot>, ApiError>
where
    R: SegmentResolver + 'static,
    E: ElevationSource + 'static,
{
    Ok(Json(state.session().move_to(index, req.position).await?))
}

async fn delete_waypoint<R, E>(
    State(state): SharedState<R, E>,
    Path(index): Path<usize>,
) -> Result<Json<SessionSnapshot>, ApiError>
where
    R: SegmentResolver + 'static,
    E: ElevationSource + 'static,
{
    Ok(Json(state.session().delete_at(index).await?))
}

async fn preview_waypoint<R, E>(
    State(state): SharedState<R, E>,
    Path(index): Path<usize>,
    Json(req): Json<PositionRequest>,
) -> Result<Json<SessionSnapshot>, ApiError>
where
    R: SegmentResolver + 'static,
    E: ElevationSource + 'static,
{
    Ok(Json(state.session().drag_preview(index, req.position)?))
}

async fn import_route<R, E>(
    State(state): SharedState<R, E>,
    Json(req): Json<ImportRequest>,
) -> Result<Json<SessionSnapshot>, ApiError>
where
    R: SegmentResolver + 'static,
    E: ElevationSource + 'static,
{
    Ok(Json(state.session().import_path(req.path)?))
}

async fn get_profile<R, E>(State(state): SharedState<R, E>) -> Json<ActivityProfile>
where
    R: SegmentResolver + 'static,
    E: ElevationSource + 'static,
{
    Json(state.session().profile())
}

async fn update_profile<R, E>(
    State(state): SharedState<R, E>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ActivityProfile>, ApiError>
where
    R: SegmentResolver + 'static,
    E: ElevationSource + 'static,
{
    Ok(Json(state.session().update_profile(&update)?))
}

async fn get_activity<R, E>(
    State(state): SharedState<R, E>,
    Query(query): Query<ActivityQuery>,
) -> Json<ActivityResponse>
where
    R: SegmentResolver + 'static,
    E: ElevationSource + 'static,
{
    let report = state.session().activity(query.seed).await;
    let title = default_title(&state).await;
    Json(ActivityResponse { title, report })
}

async fn search_location<R, E>(
    State(state): SharedState<R, E>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Place>>, ApiError>
where
    R: SegmentResolver + 'static,
    E: ElevationSource + 'static,
{
    let limit = query.limit.unwrap_or(5).clamp(1, 50);
    Ok(Json(state.geocoder().search(&query.q, limit).await?))
}

async fn save_route<R, E>(
    State(state): SharedState<R, E>,
    headers: HeaderMap,
    Json(req): Json<SaveRouteRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: SegmentResolver + 'static,
    E: ElevationSource + 'static,
{
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("route name is required".to_string()));
    }
    let path = state.session().snapshot().path;
    if path.is_empty() {
        return Err(ApiError::BadRequest("create a route before saving".to_string()));
    }

    let profile = state.session().profile();
    let report = state.session().activity(req.seed).await;
    let title = default_title(&state).await;
    let record = RunDetailsRecord::new(
        name,
        &title,
        &report.summary,
        &profile,
        report.elevation_profile.clone(),
        &Local::now(),
    );

    let caller_token = bearer_token(&headers);
    let uses_configured_token = caller_token.is_none();
    let client = state.persistence(caller_token);
    match client.create_route(&path, &record, req.overwrite).await {
        Ok(()) => Ok((
            StatusCode::CREATED,
            Json(json!({ "saved": name, "overwrite": req.overwrite })),
        )),
        Err(PersistenceError::Unauthorized) => {
            if uses_configured_token {
                state.invalidate_persistence_token();
            }
            Err(PersistenceError::Unauthorized.into())
        }
        Err(err) => Err(err.into()),
    }
}

async fn download_gpx<R, E>(
    State(state): SharedState<R, E>,
    body: Option<Json<GpxRequest>>,
) -> Result<Response, ApiError>
where
    R: SegmentResolver + 'static,
    E: ElevationSource + 'static,
{
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let path = state.session().snapshot().path;
    if path.len() < 2 {
        return Err(ApiError::BadRequest(
            "route must contain at least 2 points".to_string(),
        ));
    }

    let profile = state.session().profile();
    let report = state.session().activity(req.seed).await;
    let name = match req.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => default_title(&state).await,
    };
    let now = Local::now();
    let details = GpxRunDetails {
        name,
        date: now.format("%Y-%m-%d").to_string(),
        start_time: now.format("%H:%M").to_string(),
        description: req.description.unwrap_or_default(),
        avg_pace: report.summary.avg_pace_min_per_km,
        distance: report.summary.distance_km,
        duration: report.summary.duration_seconds.round() as i64,
        elevation_gain: report.summary.elevation_gain_m.round() as i64,
        activity_type: profile.activity.as_str().to_string(),
    };

    let file = state
        .gpx()
        .render(&path, &details, &report.buckets)
        .await
        .map_err(|err| ApiError::Upstream(err.to_string()))?;
    tracing::info!(filename = %file.filename, bytes = file.bytes.len(), "GPX rendered");

    Ok((
        [
            (header::CONTENT_TYPE, "application/gpx+xml".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", file.filename),
            ),
        ],
        file.bytes,
    )
        .into_response())
}

/// Title from the time of day and the start of the route.
async fn default_title<R, E>(state: &AppState<R, E>) -> String
where
    R: SegmentResolver + 'static,
    E: ElevationSource + 'static,
{
    let start = state.session().snapshot().path.first().copied();
    let location = match start {
        Some(position) => match state.geocoder().reverse(position).await {
            Ok(name) => Some(name),
            Err(err) => {
                tracing::debug!("Reverse geocoding failed: {}", err);
                None
            }
        },
        None => None,
    };
    activity_title(
        state.session().profile().activity,
        &Local::now(),
        location.as_deref(),
    )
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
