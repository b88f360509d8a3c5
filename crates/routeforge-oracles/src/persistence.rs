//! Saved-route service client.

use crate::http::{build_client, normalize_base};
use chrono::{DateTime, TimeZone};
use reqwest::{Client, RequestBuilder, StatusCode};
use routeforge_core::units::format_pace;
use routeforge_core::{ActivityProfile, DistanceUnit, Position, RouteSummary};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PersistenceError {
    /// Token missing, expired or rejected. The session has to sign in again.
    #[error("not authorized")]
    Unauthorized,
    #[error("a route named {0:?} already exists")]
    DuplicateName(String),
    #[error("{0}")]
    Rejected(String),
    #[error("persistence request failed: {0}")]
    Transport(String),
}

/// A route as listed by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedRoute {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub coordinates: Vec<Position>,
    #[serde(default)]
    pub run_details: Option<Value>,
}

/// Activity metadata stored alongside the path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDetailsRecord {
    pub route_name: String,
    pub distance: f64,
    pub duration: f64,
    /// `m:ss` per kilometer.
    pub pace: String,
    pub calories: f64,
    pub elevation_gain: f64,
    pub activity_type: String,
    pub name: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub start_time: String,
    pub description: String,
    pub heart_rate_enabled: bool,
    pub avg_heart_rate: f64,
    pub pace_unit: String,
    pub elevation_profile: Vec<f64>,
}

impl RunDetailsRecord {
    pub fn new<Tz: TimeZone>(
        route_name: &str,
        title: &str,
        summary: &RouteSummary,
        profile: &ActivityProfile,
        elevation_profile: Vec<f64>,
        start: &DateTime<Tz>,
    ) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let pace = format_pace(summary.avg_pace_min_per_km, DistanceUnit::Kilometers);
        Self {
            route_name: route_name.to_string(),
            distance: summary.distance_km,
            duration: summary.duration_seconds.round(),
            pace: pace.trim_end_matches(" /km").to_string(),
            calories: summary.calories_kcal,
            elevation_gain: summary.elevation_gain_m,
            activity_type: profile.activity.as_str().to_string(),
            name: title.to_string(),
            date: start.format("%Y-%m-%d").to_string(),
            start_time: start.format("%H:%M").to_string(),
            description: String::new(),
            heart_rate_enabled: profile.heart_rate.is_some(),
            avg_heart_rate: summary
                .avg_heart_rate_bpm
                .or(profile.heart_rate.map(|hr| hr.avg_bpm))
                .unwrap_or(140.0)
                .round(),
            pace_unit: "min/km".to_string(),
            elevation_profile,
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateRouteRequest<'a> {
    coordinates: &'a [Position],
    #[serde(rename = "runDetails")]
    run_details: &'a RunDetailsRecord,
}

#[derive(Debug, Clone)]
pub struct PersistenceClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl PersistenceClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            base_url: normalize_base(base_url),
            token: token
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
        }
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, PersistenceError> {
        match self.token.as_deref() {
            Some(token) => Ok(request.bearer_auth(token)),
            None => Err(PersistenceError::Unauthorized),
        }
    }

    pub async fn list_routes(&self) -> Result<Vec<SavedRoute>, PersistenceError> {
        let url = format!("{}/api/routes", self.base_url);
        let response = self
            .authorized(self.client.get(&url))?
            .send()
            .await
            .map_err(|err| PersistenceError::Transport(err.to_string()))?;
        let (status, body) = read(response).await?;
        if !status.is_success() {
            return Err(error_from_response(status, &body, ""));
        }
        serde_json::from_str(&body).map_err(|err| PersistenceError::Transport(err.to_string()))
    }

    pub async fn create_route(
        &self,
        path: &[Position],
        details: &RunDetailsRecord,
        overwrite: bool,
    ) -> Result<(), PersistenceError> {
        let mut url = format!("{}/api/routes", self.base_url);
        if overwrite {
            url.push_str("?overwrite=true");
        }
        let request = CreateRouteRequest {
            coordinates: path,
            run_details: details,
        };
        let response = self
            .authorized(self.client.post(&url).json(&request))?
            .send()
            .await
            .map_err(|err| PersistenceError::Transport(err.to_string()))?;
        let (status, body) = read(response).await?;
        if status.is_success() {
            tracing::info!(name = %details.route_name, overwrite, "Route saved");
            return Ok(());
        }
        Err(error_from_response(status, &body, &details.route_name))
    }

    pub async fn delete_route(&self, id: &str) -> Result<(), PersistenceError> {
        let url = format!("{}/api/routes/{}", self.base_url, id);
        let response = self
            .authorized(self.client.delete(&url))?
            .send()
            .await
            .map_err(|err| PersistenceError::Transport(err.to_string()))?;
        let (status, body) = read(response).await?;
        if !status.is_success() {
            return Err(error_from_response(status, &body, ""));
        }
        Ok(())
    }
}

async fn read(response: reqwest::Response) -> Result<(StatusCode, String), PersistenceError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| PersistenceError::Transport(err.to_string()))?;
    Ok((status, body))
}

/// Maps a failed response to a typed error.
pub fn error_from_response(status: StatusCode, body: &str, route_name: &str) -> PersistenceError {
    if status == StatusCode::UNAUTHORIZED {
        return PersistenceError::Unauthorized;
    }
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|payload| payload.get("detail").map(format_detail));
    if status == StatusCode::CONFLICT
        || detail
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains("already exists"))
    {
        return PersistenceError::DuplicateName(route_name.to_string());
    }
    PersistenceError::Rejected(detail.unwrap_or_else(|| format!("request failed with {}", status)))
}

/// Flattens a FastAPI `detail` payload: a string, an array of validation
/// errors, or an arbitrary object.
pub fn format_detail(detail: &Value) -> String {
    match detail {
        Value::String(message) => message.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(message) => message.clone(),
                Value::Object(fields) => match (fields.get("loc"), fields.get("msg")) {
                    (Some(Value::Array(loc)), Some(Value::String(msg))) => {
                        let loc: Vec<String> = loc
                            .iter()
                            .map(|part| match part {
                                Value::String(s) => s.clone(),
                                other => other.to_string(),
                            })
                            .collect();
                        format!("{}: {}", loc.join("."), msg)
                    }
                    _ => item.to_string(),
                },
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn unauthorized_wins() {
        let err = error_from_response(StatusCode::UNAUTHORIZED, r#"{"detail":"x"}"#, "a");
        assert_eq!(err, PersistenceError::Unauthorized);
    }

    #[test]
    fn duplicate_name_from_status_or_detail() {
        assert_eq!(
            error_from_response(StatusCode::CONFLICT, "", "Loop"),
            PersistenceError::DuplicateName("Loop".into())
        );
        assert_eq!(
            error_from_response(
                StatusCode::BAD_REQUEST,
                r#"{"detail":"Route with name 'Loop' already exists"}"#,
                "Loop"
            ),
            PersistenceError::DuplicateName("Loop".into())
        );
    }

    #[test]
    fn validation_details_are_flattened() {
        let body = r#"{"detail":[{"loc":["body","runDetails","distance"],"msg":"field required","type":"missing"},
                                 {"loc":["body","coordinates",0],"msg":"not a list"}]}"#;
        assert_eq!(
            error_from_response(StatusCode::UNPROCESSABLE_ENTITY, body, "a"),
            PersistenceError::Rejected(
                "body.runDetails.distance: field required; body.coordinates.0: not a list".into()
            )
        );
        let body = r#"{"detail":{"code":7}}"#;
        assert_eq!(
            error_from_response(StatusCode::BAD_REQUEST, body, "a"),
            PersistenceError::Rejected(r#"{"code":7}"#.into())
        );
        assert_eq!(
            error_from_response(StatusCode::INTERNAL_SERVER_ERROR, "oops", "a"),
            PersistenceError::Rejected("request failed with 500 Internal Server Error".into())
        );
    }

    #[test]
    fn run_details_record_fields() {
        let profile = ActivityProfile::default();
        let summary = RouteSummary {
            distance_km: 5.0,
            duration_seconds: 1800.0,
            elevation_gain_m: 42.0,
            avg_pace_min_per_km: 6.0,
            avg_speed_kmh: 10.0,
            avg_heart_rate_bpm: None,
            calories_kcal: 350.0,
        };
        let start = Utc.with_ymd_and_hms(2024, 6, 2, 7, 5, 0).unwrap();
        let record =
            RunDetailsRecord::new("Loop", "Morning Run in Paris", &summary, &profile, vec![], &start);
        assert_eq!(record.pace, "6:00");
        assert_eq!(record.date, "2024-06-02");
        assert_eq!(record.start_time, "07:05");
        assert_eq!(record.activity_type, "run");
        assert!(!record.heart_rate_enabled);
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized_without_network() {
        let client = PersistenceClient::new("http://127.0.0.1:9", None, Duration::from_millis(100));
        assert_eq!(client.list_routes().await.unwrap_err(), PersistenceError::Unauthorized);
        assert_eq!(client.delete_route("r1").await.unwrap_err(), PersistenceError::Unauthorized);
    }
}
