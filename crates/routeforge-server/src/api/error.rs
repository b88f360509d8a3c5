use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use routeforge_core::{ProfileError, StoreError};
use routeforge_oracles::{GeocodeError, PersistenceError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("{0}")]
    BadRequest(String),
    #[error("upstream service failed: {0}")]
    Upstream(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Store(StoreError::IndexOutOfRange { .. }) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::InvalidPosition) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Profile(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Geocode(GeocodeError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Geocode(GeocodeError::Transport(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Persistence(PersistenceError::Unauthorized) => StatusCode::UNAUTHORIZED,
            ApiError::Persistence(PersistenceError::DuplicateName(_)) => StatusCode::CONFLICT,
            ApiError::Persistence(PersistenceError::Rejected(_)) => StatusCode::BAD_REQUEST,
            ApiError::Persistence(PersistenceError::Transport(_)) => StatusCode::BAD_GATEWAY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!("Request failed: {}", self);
        }
        let mut body = json!({ "error": self.to_string() });
        if let ApiError::Persistence(PersistenceError::DuplicateName(_)) = &self {
            body["hint"] = json!("retry with overwrite=true");
        }
        (status, Json(body)).into_response()
    }
}
