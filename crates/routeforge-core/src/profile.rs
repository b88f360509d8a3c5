//! Activity profile and validated user input.

use crate::models::ActivityType;
use crate::rules::InputLimits;
use crate::units::{pace_to_speed, speed_to_pace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_RUN_PACE: f64 = 6.0;
/// 25 km/h expressed as pace.
pub const DEFAULT_BIKE_PACE: f64 = 2.4;
pub const DEFAULT_VARIATION_PERCENT: f64 = 20.0;

#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("could not parse {field}: {value:?}")]
    NotANumber { field: &'static str, value: String },
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("unknown activity type {0:?}")]
    UnknownActivity(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartRateTarget {
    pub avg_bpm: f64,
    pub variability_bpm: f64,
}

impl Default for HeartRateTarget {
    fn default() -> Self {
        Self {
            avg_bpm: 150.0,
            variability_bpm: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityProfile {
    pub activity: ActivityType,
    /// Target pace. Bike targets are stored as pace = 60 / speed.
    pub pace_min_per_km: f64,
    pub variation_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<HeartRateTarget>,
}

impl Default for ActivityProfile {
    fn default() -> Self {
        Self {
            activity: ActivityType::Run,
            pace_min_per_km: DEFAULT_RUN_PACE,
            variation_percent: DEFAULT_VARIATION_PERCENT,
            heart_rate: None,
        }
    }
}

/// Partial update as submitted by the UI. Every present field is validated
/// before any of them is applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub activity: Option<String>,
    /// Run pace as a number or `m:ss`.
    pub pace: Option<String>,
    pub speed_kmh: Option<String>,
    pub variation_percent: Option<String>,
    pub heart_rate_enabled: Option<bool>,
    pub avg_heart_rate: Option<String>,
    pub heart_rate_variability: Option<String>,
}

impl ActivityProfile {
    pub fn target_speed_kmh(&self) -> f64 {
        pace_to_speed(self.pace_min_per_km)
    }

    /// Switches activity, swapping the default pace when the current target is
    /// still the other activity's default.
    pub fn set_activity(&mut self, activity: ActivityType) {
        if activity == self.activity {
            return;
        }
        match activity {
            ActivityType::Bike if self.pace_min_per_km == DEFAULT_RUN_PACE => {
                self.pace_min_per_km = DEFAULT_BIKE_PACE;
            }
            ActivityType::Run if self.pace_min_per_km == DEFAULT_BIKE_PACE => {
                self.pace_min_per_km = DEFAULT_RUN_PACE;
            }
            _ => {}
        }
        self.activity = activity;
    }

    pub fn set_run_pace(&mut self, input: &str) -> Result<(), ProfileError> {
        let (min, max) = InputLimits::default().run_pace_min_per_km;
        let pace = parse_pace(input)?;
        self.pace_min_per_km = check_range("pace", pace, min, max)?;
        Ok(())
    }

    pub fn set_bike_speed(&mut self, input: &str) -> Result<(), ProfileError> {
        let (min, max) = InputLimits::default().bike_speed_kmh;
        let speed = parse_number("speed", input)?;
        let speed = check_range("speed", speed, min, max)?;
        self.pace_min_per_km = speed_to_pace(speed);
        Ok(())
    }

    pub fn set_variation(&mut self, input: &str) -> Result<(), ProfileError> {
        let (min, max) = InputLimits::default().variation_percent;
        let value = parse_number("variation", input)?;
        self.variation_percent = check_range("variation", value, min, max)?;
        Ok(())
    }

    pub fn set_heart_rate_enabled(&mut self, enabled: bool) {
        match (enabled, self.heart_rate.is_some()) {
            (true, false) => self.heart_rate = Some(HeartRateTarget::default()),
            (false, true) => self.heart_rate = None,
            _ => {}
        }
    }

    pub fn set_avg_heart_rate(&mut self, input: &str) -> Result<(), ProfileError> {
        let (min, max) = InputLimits::default().heart_rate_bpm;
        let value = parse_number("heart rate", input)?;
        let value = check_range("heart rate", value, min, max)?;
        self.heart_rate.get_or_insert_with(HeartRateTarget::default).avg_bpm = value;
        Ok(())
    }

    pub fn set_heart_rate_variability(&mut self, input: &str) -> Result<(), ProfileError> {
        let (min, max) = InputLimits::default().heart_rate_variability_bpm;
        let value = parse_number("heart rate variability", input)?;
        let value = check_range("heart rate variability", value, min, max)?;
        self.heart_rate
            .get_or_insert_with(HeartRateTarget::default)
            .variability_bpm = value;
        Ok(())
    }

    /// Applies `update` atomically: on error the profile is left as it was.
    pub fn apply(&mut self, update: &ProfileUpdate) -> Result<(), ProfileError> {
        let mut next = self.clone();
        if let Some(activity) = &update.activity {
            let parsed = ActivityType::parse(activity)
                .ok_or_else(|| ProfileError::UnknownActivity(activity.clone()))?;
            next.set_activity(parsed);
        }
        if let Some(pace) = &update.pace {
            next.set_run_pace(pace)?;
        }
        if let Some(speed) = &update.speed_kmh {
            next.set_bike_speed(speed)?;
        }
        if let Some(variation) = &update.variation_percent {
            next.set_variation(variation)?;
        }
        if let Some(enabled) = update.heart_rate_enabled {
            next.set_heart_rate_enabled(enabled);
        }
        if let Some(avg) = &update.avg_heart_rate {
            next.set_avg_heart_rate(avg)?;
        }
        if let Some(variability) = &update.heart_rate_variability {
            next.set_heart_rate_variability(variability)?;
        }
        *self = next;
        Ok(())
    }
}

/// Parses `6`, `5.5` or `5:30` as minutes per kilometer.
pub fn parse_pace(input: &str) -> Result<f64, ProfileError> {
    let trimmed = input.trim();
    let not_a_number = || ProfileError::NotANumber {
        field: "pace",
        value: input.to_string(),
    };
    match trimmed.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u32 = minutes.trim().parse().map_err(|_| not_a_number())?;
            let seconds: u32 = seconds.trim().parse().map_err(|_| not_a_number())?;
            if seconds >= 60 {
                return Err(not_a_number());
            }
            Ok(minutes as f64 + seconds as f64 / 60.0)
        }
        None => parse_number("pace", trimmed),
    }
}

fn parse_number(field: &'static str, input: &str) -> Result<f64, ProfileError> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ProfileError::NotANumber {
            field,
            value: input.to_string(),
        })
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<f64, ProfileError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ProfileError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}
