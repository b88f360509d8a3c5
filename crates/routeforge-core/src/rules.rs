//! Physiological bounds and input limits for the simulator.

use serde::{Deserialize, Serialize};

/// Configuration for simulation bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationBounds {
    /// Slowest/fastest simulated running pace (min/km)
    pub min_pace_min_per_km: f64,
    pub max_pace_min_per_km: f64,
    /// Simulated cycling speed range (km/h)
    pub min_speed_kmh: f64,
    pub max_speed_kmh: f64,
    /// Simulated heart rate range (bpm)
    pub min_heart_rate_bpm: f64,
    pub max_heart_rate_bpm: f64,
    /// Elevation change (m) per bucket below which terrain has no effect
    pub flat_threshold_m: f64,
}

impl Default for SimulationBounds {
    fn default() -> Self {
        Self {
            min_pace_min_per_km: 3.0,
            max_pace_min_per_km: 12.0,
            min_speed_kmh: 5.0,
            max_speed_kmh: 50.0,
            min_heart_rate_bpm: 80.0,
            max_heart_rate_bpm: 220.0,
            flat_threshold_m: 10.0,
        }
    }
}

impl SimulationBounds {
    pub fn clamp_pace(&self, pace: f64) -> f64 {
        pace.clamp(self.min_pace_min_per_km, self.max_pace_min_per_km)
    }

    pub fn clamp_speed(&self, speed: f64) -> f64 {
        speed.clamp(self.min_speed_kmh, self.max_speed_kmh)
    }

    pub fn clamp_heart_rate(&self, bpm: f64) -> f64 {
        bpm.clamp(self.min_heart_rate_bpm, self.max_heart_rate_bpm)
    }
}

/// Limits on what a user may enter for an activity profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputLimits {
    pub run_pace_min_per_km: (f64, f64),
    pub bike_speed_kmh: (f64, f64),
    pub variation_percent: (f64, f64),
    pub heart_rate_bpm: (f64, f64),
    pub heart_rate_variability_bpm: (f64, f64),
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            run_pace_min_per_km: (1.0, 12.0),
            bike_speed_kmh: (7.0, 90.0),
            variation_percent: (0.0, 80.0),
            heart_rate_bpm: (80.0, 220.0),
            heart_rate_variability_bpm: (1.0, 40.0),
        }
    }
}
