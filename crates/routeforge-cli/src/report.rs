//! Plain-text rendering of a simulated route.

use routeforge_core::units::{
    format_distance, format_duration, format_elevation, format_pace, format_speed,
};
use routeforge_core::{ActivityType, DistanceUnit, KmBucket, RouteSummary};
use std::fmt::Write;

/// One row per kilometer bucket.
pub fn render_buckets(buckets: &[KmBucket], activity: ActivityType, unit: DistanceUnit) -> String {
    let mut out = String::new();
    let effort = match activity {
        ActivityType::Run => "pace",
        ActivityType::Bike => "speed",
    };
    let _ = writeln!(out, "{:>4}  {:>9}  {:>12}  {:>5}", "km", "elev", effort, "hr");
    for bucket in buckets {
        let effort = match activity {
            ActivityType::Run => format_pace(bucket.pace_min_per_km, unit),
            ActivityType::Bike => format_speed(bucket.speed_kmh(), unit),
        };
        let heart_rate = bucket
            .heart_rate_bpm
            .map(|bpm| format!("{:.0}", bpm))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:>4}  {:>9}  {:>12}  {:>5}",
            bucket.index + 1,
            signed(format_elevation(bucket.elevation_delta_m, unit), bucket.elevation_delta_m),
            effort,
            heart_rate
        );
    }
    out
}

pub fn render_summary(summary: &RouteSummary, activity: ActivityType, unit: DistanceUnit) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Distance:       {}", format_distance(summary.distance_km, unit));
    let _ = writeln!(out, "Duration:       {}", format_duration(summary.duration_seconds));
    let _ = writeln!(out, "Elevation gain: {}", format_elevation(summary.elevation_gain_m, unit));
    match activity {
        ActivityType::Run => {
            let _ = writeln!(out, "Avg pace:       {}", format_pace(summary.avg_pace_min_per_km, unit));
        }
        ActivityType::Bike => {
            let _ = writeln!(out, "Avg speed:      {}", format_speed(summary.avg_speed_kmh, unit));
        }
    }
    if let Some(bpm) = summary.avg_heart_rate_bpm {
        let _ = writeln!(out, "Avg heart rate: {:.0} bpm", bpm);
    }
    let _ = writeln!(out, "Calories:       {:.0} kcal", summary.calories_kcal);
    out
}

fn signed(formatted: String, value: f64) -> String {
    if value > 0.0 {
        format!("+{}", formatted)
    } else {
        formatted
    }
}
