//! Unit conversions and display formatting.

use serde::{Deserialize, Serialize};

const KM_PER_MILE: f64 = 1.60934;
const MILES_PER_KM: f64 = 0.621371;
const FEET_PER_METER: f64 = 3.28084;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Kilometers,
    Miles,
}

impl DistanceUnit {
    pub fn from_km(&self, km: f64) -> f64 {
        match self {
            DistanceUnit::Kilometers => km,
            DistanceUnit::Miles => km_to_miles(km),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles => "mi",
        }
    }
}

pub fn km_to_miles(km: f64) -> f64 {
    km * MILES_PER_KM
}

pub fn miles_to_km(miles: f64) -> f64 {
    miles * KM_PER_MILE
}

pub fn kmh_to_mph(kmh: f64) -> f64 {
    kmh * MILES_PER_KM
}

pub fn mph_to_kmh(mph: f64) -> f64 {
    mph * KM_PER_MILE
}

pub fn pace_km_to_mile(pace_min_per_km: f64) -> f64 {
    pace_min_per_km * KM_PER_MILE
}

pub fn pace_mile_to_km(pace_min_per_mile: f64) -> f64 {
    pace_min_per_mile / KM_PER_MILE
}

pub fn meters_to_feet(meters: f64) -> f64 {
    meters * FEET_PER_METER
}

/// min/km -> km/h. Both directions are the same reciprocal.
pub fn pace_to_speed(pace_min_per_km: f64) -> f64 {
    60.0 / pace_min_per_km
}

pub fn speed_to_pace(speed_kmh: f64) -> f64 {
    60.0 / speed_kmh
}

pub fn format_distance(km: f64, unit: DistanceUnit) -> String {
    format!("{:.2} {}", unit.from_km(km), unit.label())
}

pub fn format_elevation(meters: f64, unit: DistanceUnit) -> String {
    match unit {
        DistanceUnit::Kilometers => format!("{} m", meters.round()),
        DistanceUnit::Miles => format!("{} ft", meters_to_feet(meters).round()),
    }
}

/// `m:ss` pace string, per kilometer or per mile.
pub fn format_pace(pace_min_per_km: f64, unit: DistanceUnit) -> String {
    let pace = match unit {
        DistanceUnit::Kilometers => pace_min_per_km,
        DistanceUnit::Miles => pace_km_to_mile(pace_min_per_km),
    };
    if !pace.is_finite() || pace < 0.0 {
        return "0:00".to_string();
    }
    let mut minutes = pace.floor() as u64;
    let mut seconds = ((pace - pace.floor()) * 60.0).round() as u64;
    if seconds == 60 {
        minutes += 1;
        seconds = 0;
    }
    format!("{}:{:02} /{}", minutes, seconds, unit.label())
}

pub fn format_speed(speed_kmh: f64, unit: DistanceUnit) -> String {
    match unit {
        DistanceUnit::Kilometers => format!("{:.1} km/h", speed_kmh),
        DistanceUnit::Miles => format!("{:.1} mph", kmh_to_mph(speed_kmh)),
    }
}

/// `h:mm:ss` duration string.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}
