//! Per-kilometer pace, speed and heart rate simulation.
//!
//! Every series is built in three passes: raw terrain/periodic/noise adjustment,
//! mean subtraction so the series averages exactly to the target, then clamping
//! to physiological bounds.

use crate::elevation::{bucket_count, placeholder_deltas};
use crate::models::{ActivityType, KmBucket, RouteSummary};
use crate::profile::{ActivityProfile, HeartRateTarget};
use crate::rules::SimulationBounds;
use crate::units::{pace_to_speed, speed_to_pace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

const CALORIES_PER_KM: f64 = 70.0;

/// Everything the simulator reads.
#[derive(Debug, Clone)]
pub struct SimulationInput<'a> {
    pub distance_km: f64,
    /// Elevation change per bucket; empty means no profile is available.
    pub elevation_deltas: &'a [f64],
    pub profile: &'a ActivityProfile,
}

pub struct ActivitySimulator {
    bounds: SimulationBounds,
    rng: StdRng,
}

impl ActivitySimulator {
    pub fn new(bounds: SimulationBounds, seed: u64) -> Self {
        Self {
            bounds,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(SimulationBounds::default(), seed)
    }

    /// Simulator seeded from the thread RNG.
    pub fn from_entropy() -> Self {
        Self::seeded(rand::random())
    }

    pub fn bounds(&self) -> &SimulationBounds {
        &self.bounds
    }

    pub fn simulate(&mut self, input: &SimulationInput<'_>) -> Vec<KmBucket> {
        let buckets = bucket_count(input.distance_km);
        if buckets == 0 {
            return Vec::new();
        }
        let deltas = effective_deltas(input.elevation_deltas, buckets);
        let profile = input.profile;
        let bounds = self.bounds.clone();

        let paces: Vec<f64> = match profile.activity {
            ActivityType::Run => self
                .centered_pace(&deltas, profile)
                .into_iter()
                .map(|pace| bounds.clamp_pace(pace))
                .collect(),
            ActivityType::Bike => self
                .centered_speed(&deltas, profile)
                .into_iter()
                .map(|speed| speed_to_pace(bounds.clamp_speed(speed)))
                .collect(),
        };

        let heart_rates: Option<Vec<f64>> = profile.heart_rate.map(|target| {
            self.centered_heart_rate(&deltas, &target)
                .into_iter()
                .map(|bpm| bounds.clamp_heart_rate(bpm))
                .collect()
        });

        paces
            .into_iter()
            .enumerate()
            .map(|(index, pace)| KmBucket {
                index,
                elevation_delta_m: deltas[index],
                pace_min_per_km: pace,
                heart_rate_bpm: heart_rates.as_ref().map(|hr| hr[index]),
            })
            .collect()
    }

    /// Unclamped running pace per bucket; averages exactly to the target.
    pub fn centered_pace(&mut self, deltas: &[f64], profile: &ActivityProfile) -> Vec<f64> {
        let flat = self.bounds.flat_threshold_m;
        let scale = profile.variation_percent / 100.0;
        let raw = self.raw_series(deltas, 0.2, 0.3, |e| {
            if e > flat {
                (0.015 * e).min(2.0)
            } else if e < -flat {
                (0.008 * e).max(-0.8)
            } else {
                0.0
            }
        });
        center(&raw, profile.pace_min_per_km, scale)
    }

    /// Unclamped cycling speed per bucket; averages exactly to the target speed.
    pub fn centered_speed(&mut self, deltas: &[f64], profile: &ActivityProfile) -> Vec<f64> {
        let flat = self.bounds.flat_threshold_m;
        let scale = profile.variation_percent / 100.0;
        let raw = self.raw_series(deltas, 1.0, 1.5, |e| {
            if e > flat {
                -(0.06 * e).min(8.0)
            } else if e < -flat {
                (0.04 * e.abs()).min(4.0)
            } else {
                0.0
            }
        });
        center(&raw, pace_to_speed(profile.pace_min_per_km), scale)
    }

    /// Unclamped heart rate per bucket. Scaled by variability / 40, not / 100.
    pub fn centered_heart_rate(&mut self, deltas: &[f64], target: &HeartRateTarget) -> Vec<f64> {
        let flat = self.bounds.flat_threshold_m;
        let scale = target.variability_bpm / 40.0;
        let raw = self.raw_series(deltas, 3.0, 4.0, |e| {
            if e > flat {
                (0.8 * e).min(25.0)
            } else if e < -flat {
                (0.3 * e).max(-15.0)
            } else {
                0.0
            }
        });
        center(&raw, target.avg_bpm, scale)
    }

    fn raw_series(
        &mut self,
        deltas: &[f64],
        periodic_amplitude: f64,
        noise_amplitude: f64,
        terrain: impl Fn(f64) -> f64,
    ) -> Vec<f64> {
        let k = deltas.len() as f64;
        deltas
            .iter()
            .enumerate()
            .map(|(i, &e)| {
                let periodic = (i as f64 / k * 4.0 * PI).sin() * periodic_amplitude;
                let noise = (self.rng.random::<f64>() - 0.5) * noise_amplitude;
                terrain(e) + periodic + noise
            })
            .collect()
    }
}

/// Simulates with default bounds. `None` seeds from the thread RNG.
pub fn simulate(input: &SimulationInput<'_>, seed: Option<u64>) -> Vec<KmBucket> {
    let mut simulator = match seed {
        Some(seed) => ActivitySimulator::seeded(seed),
        None => ActivitySimulator::from_entropy(),
    };
    simulator.simulate(input)
}

/// Headline figures for a simulated route.
pub fn summarize(
    distance_km: f64,
    elevation_gain_m: f64,
    profile: &ActivityProfile,
    buckets: &[KmBucket],
) -> RouteSummary {
    let pace = profile.pace_min_per_km;
    let avg_heart_rate_bpm = profile.heart_rate.map(|target| {
        let rates: Vec<f64> = buckets.iter().filter_map(|b| b.heart_rate_bpm).collect();
        if rates.is_empty() {
            target.avg_bpm
        } else {
            rates.iter().sum::<f64>() / rates.len() as f64
        }
    });
    RouteSummary {
        distance_km,
        duration_seconds: distance_km * pace * 60.0,
        elevation_gain_m,
        avg_pace_min_per_km: pace,
        avg_speed_kmh: pace_to_speed(pace),
        avg_heart_rate_bpm,
        calories_kcal: (distance_km * CALORIES_PER_KM).round(),
    }
}

fn effective_deltas(deltas: &[f64], buckets: usize) -> Vec<f64> {
    if deltas.is_empty() {
        return placeholder_deltas(buckets);
    }
    (0..buckets)
        .map(|i| deltas.get(i).copied().unwrap_or(0.0))
        .collect()
}

fn center(raw: &[f64], target: f64, scale: f64) -> Vec<f64> {
    if raw.is_empty() {
        return Vec::new();
    }
    let scaled: Vec<f64> = raw.iter().map(|r| r * scale).collect();
    let mean = scaled.iter().sum::<f64>() / scaled.len() as f64;
    scaled.iter().map(|adj| target + adj - mean).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mean(values: &[f64]) -> f64 {
        values.iter().sum::<f64>() / values.len() as f64
    }

    fn hilly() -> Vec<f64> {
        vec![0.0, 40.0, 120.0, -60.0, -200.0, 15.0, 5.0, -12.0, 300.0, 0.0]
    }

    #[test]
    fn centered_series_hit_target_exactly() {
        let deltas = hilly();
        let mut profile = ActivityProfile {
            variation_percent: 80.0,
            ..Default::default()
        };
        let mut sim = ActivitySimulator::seeded(7);

        let paces = sim.centered_pace(&deltas, &profile);
        assert!((mean(&paces) - 6.0).abs() < 1e-9);

        profile.set_activity(ActivityType::Bike);
        let speeds = sim.centered_speed(&deltas, &profile);
        assert!((mean(&speeds) - 25.0).abs() < 1e-9);

        let target = HeartRateTarget {
            avg_bpm: 150.0,
            variability_bpm: 40.0,
        };
        let rates = sim.centered_heart_rate(&deltas, &target);
        assert!((mean(&rates) - 150.0).abs() < 1e-9);
    }

    #[test]
    fn output_stays_within_bounds() {
        let deltas = vec![2000.0, -2000.0, 2000.0, -2000.0];
        let bounds = SimulationBounds::default();
        for activity in [ActivityType::Run, ActivityType::Bike] {
            let mut profile = ActivityProfile {
                variation_percent: 80.0,
                heart_rate: Some(HeartRateTarget {
                    avg_bpm: 215.0,
                    variability_bpm: 40.0,
                }),
                ..Default::default()
            };
            profile.set_activity(activity);
            let input = SimulationInput {
                distance_km: 4.0,
                elevation_deltas: &deltas,
                profile: &profile,
            };
            for seed in 0..20 {
                for bucket in simulate(&input, Some(seed)) {
                    let pace = bucket.pace_min_per_km;
                    match activity {
                        ActivityType::Run => assert!((3.0..=12.0).contains(&pace)),
                        ActivityType::Bike => {
                            let speed = bucket.speed_kmh();
                            assert!(speed >= bounds.min_speed_kmh - 1e-9);
                            assert!(speed <= bounds.max_speed_kmh + 1e-9);
                        }
                    }
                    let hr = bucket.heart_rate_bpm.unwrap();
                    assert!((80.0..=220.0).contains(&hr));
                }
            }
        }
    }

    #[test]
    fn uphill_is_slower_than_downhill() {
        let deltas = vec![200.0, -200.0];
        let profile = ActivityProfile {
            variation_percent: 80.0,
            ..Default::default()
        };
        let input = SimulationInput {
            distance_km: 2.0,
            elevation_deltas: &deltas,
            profile: &profile,
        };
        let buckets = simulate(&input, Some(1));
        assert!(buckets[0].pace_min_per_km > buckets[1].pace_min_per_km);
    }

    #[test]
    fn same_seed_same_series() {
        let deltas = hilly();
        let profile = ActivityProfile::default();
        let input = SimulationInput {
            distance_km: 9.3,
            elevation_deltas: &deltas,
            profile: &profile,
        };
        assert_eq!(simulate(&input, Some(42)), simulate(&input, Some(42)));
    }

    #[test]
    fn missing_profile_uses_flat_placeholder() {
        let profile = ActivityProfile::default();
        let input = SimulationInput {
            distance_km: 2.4,
            elevation_deltas: &[],
            profile: &profile,
        };
        let buckets = simulate(&input, Some(3));
        assert_eq!(buckets.len(), 3);
        assert!(buckets.iter().all(|b| b.elevation_delta_m == 0.0));
        assert!(buckets.iter().all(|b| b.heart_rate_bpm.is_none()));
    }

    #[test]
    fn zero_distance_has_no_buckets() {
        let profile = ActivityProfile::default();
        let input = SimulationInput {
            distance_km: 0.0,
            elevation_deltas: &[],
            profile: &profile,
        };
        assert!(simulate(&input, Some(0)).is_empty());
    }

    #[test]
    fn summary_uses_target_pace() {
        let profile = ActivityProfile::default();
        let summary = summarize(10.0, 123.0, &profile, &[]);
        assert_eq!(summary.duration_seconds, 3600.0);
        assert_eq!(summary.avg_speed_kmh, 10.0);
        assert_eq!(summary.calories_kcal, 700.0);
        assert!(summary.avg_heart_rate_bpm.is_none());
    }
}
