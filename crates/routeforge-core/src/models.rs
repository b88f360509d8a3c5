//! Core data models for route editing and activity simulation.

use serde::{Deserialize, Serialize};

/// A geographic position in degrees.
///
/// Serialized as a `[lat, lon]` pair, which is what map front-ends hand us.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// True when both coordinates are within `tolerance_deg` of `other`.
    pub fn near(&self, other: &Position, tolerance_deg: f64) -> bool {
        (self.lat - other.lat).abs() < tolerance_deg && (self.lon - other.lon).abs() < tolerance_deg
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

impl From<[f64; 2]> for Position {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<Position> for [f64; 2] {
    fn from(value: Position) -> Self {
        [value.lat, value.lon]
    }
}

impl From<(f64, f64)> for Position {
    fn from(value: (f64, f64)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// A user-placed anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub index: usize,
    pub position: Position,
}

/// Role of a waypoint, derived from where it sits in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaypointRole {
    Start,
    Intermediate,
    End,
}

/// Sub-path between two consecutive waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    points: Vec<Position>,
}

impl Segment {
    /// Direct line between the two waypoints.
    pub fn straight(from: Position, to: Position) -> Self {
        Self {
            points: vec![from, to],
        }
    }

    /// Segment built from a resolver answer.
    ///
    /// The endpoints are pinned to the waypoints so the stitched path always
    /// starts and ends exactly on them. An answer with fewer than two points
    /// degrades to the straight line.
    pub fn anchored(from: Position, to: Position, resolved: Vec<Position>) -> Self {
        if resolved.len() < 2 || resolved.iter().any(|point| !point.is_finite()) {
            return Self::straight(from, to);
        }
        let mut points = resolved;
        let last = points.len() - 1;
        points[0] = from;
        points[last] = to;
        Self { points }
    }

    /// Resolver result, or the straight line when the resolver gave up.
    pub fn from_resolution(from: Position, to: Position, resolved: Option<Vec<Position>>) -> Self {
        match resolved {
            Some(points) => Self::anchored(from, to, points),
            None => Self::straight(from, to),
        }
    }

    /// Wraps already-trusted points (e.g. a slice of an imported path).
    pub fn from_points(points: Vec<Position>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Position] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Position> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Position> {
        self.points.last()
    }
}

/// Activity being simulated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    #[default]
    Run,
    Bike,
}

impl ActivityType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "run" | "running" => Some(Self::Run),
            "bike" | "ride" | "cycling" => Some(Self::Bike),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Run => "run",
            ActivityType::Bike => "bike",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ActivityType::Run => "Run",
            ActivityType::Bike => "Bike Ride",
        }
    }
}

/// Per-distance-unit aggregate of elevation and simulated metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KmBucket {
    pub index: usize,
    pub elevation_delta_m: f64,
    /// Simulated pace. Bike buckets are stored as pace too (pace = 60 / speed).
    pub pace_min_per_km: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate_bpm: Option<f64>,
}

impl KmBucket {
    pub fn speed_kmh(&self) -> f64 {
        crate::units::pace_to_speed(self.pace_min_per_km)
    }
}

/// Aggregate figures shown next to the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub distance_km: f64,
    pub duration_seconds: f64,
    pub elevation_gain_m: f64,
    pub avg_pace_min_per_km: f64,
    pub avg_speed_kmh: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_heart_rate_bpm: Option<f64>,
    pub calories_kcal: f64,
}
