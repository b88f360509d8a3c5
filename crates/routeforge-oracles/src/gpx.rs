//! GPX rendering service client.

use crate::http::{build_client, normalize_base};
use anyhow::{bail, Context, Result};
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::Client;
use routeforge_core::{KmBucket, Position};
use serde::Serialize;
use std::time::Duration;

/// Activity fields the renderer stamps onto the track.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GpxRunDetails {
    pub name: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub start_time: String,
    pub description: String,
    pub avg_pace: f64,
    pub distance: f64,
    pub duration: i64,
    pub elevation_gain: i64,
    pub activity_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GpxRequest<'a> {
    route: &'a [Position],
    run_details: &'a GpxRunDetails,
    km_buckets: &'a [KmBucket],
}

/// A rendered file ready for download.
#[derive(Debug, Clone)]
pub struct GpxFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct GpxClient {
    client: Client,
    base_url: String,
}

impl GpxClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            base_url: normalize_base(base_url),
        }
    }

    pub async fn render(
        &self,
        path: &[Position],
        details: &GpxRunDetails,
        buckets: &[KmBucket],
    ) -> Result<GpxFile> {
        if path.len() < 2 {
            bail!("route must contain at least 2 points");
        }
        let url = format!("{}/api/generate-gpx", self.base_url);
        let request = GpxRequest {
            route: path,
            run_details: details,
            km_buckets: buckets,
        };
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to send GPX request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("GPX generation failed: {} {}", status, body);
        }

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| fallback_filename(&details.name, &details.date));
        let bytes = response
            .bytes()
            .await
            .context("Failed to read GPX body")?
            .to_vec();
        Ok(GpxFile { filename, bytes })
    }
}

/// `filename` parameter of a `Content-Disposition` header.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

/// `{name}_{date}.gpx`, keeping only alphanumerics, spaces, dashes and
/// underscores, with spaces turned into underscores.
pub fn fallback_filename(name: &str, date: &str) -> String {
    let safe: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    format!("{}_{}.gpx", safe.trim_end().replace(' ', "_"), date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_from_header() {
        assert_eq!(
            filename_from_disposition("attachment; filename=Test_Run_2026-05-29.gpx").unwrap(),
            "Test_Run_2026-05-29.gpx"
        );
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="a b.gpx""#).unwrap(),
            "a b.gpx"
        );
        assert!(filename_from_disposition("inline").is_none());
    }

    #[test]
    fn fallback_filename_is_sanitized() {
        assert_eq!(
            fallback_filename("Morning Run in Café/Paris! ", "2024-06-02"),
            "Morning_Run_in_CaféParis_2024-06-02.gpx"
        );
    }

    #[test]
    fn request_uses_camel_case() {
        let details = GpxRunDetails {
            name: "Test Run".into(),
            date: "2026-05-29".into(),
            start_time: "08:00".into(),
            description: String::new(),
            avg_pace: 6.0,
            distance: 5.0,
            duration: 1800,
            elevation_gain: 12,
            activity_type: "run".into(),
        };
        let path = [Position::new(0.0, 0.0), Position::new(0.0, 0.01)];
        let json = serde_json::to_value(GpxRequest {
            route: &path,
            run_details: &details,
            km_buckets: &[],
        })
        .unwrap();
        assert_eq!(json["route"][1], serde_json::json!([0.0, 0.01]));
        assert_eq!(json["runDetails"]["startTime"], "08:00");
        assert_eq!(json["runDetails"]["elevationGain"], 12);
    }
}
