//! Default activity titles.

use crate::models::ActivityType;
use chrono::{DateTime, TimeZone, Timelike};
use serde::Deserialize;

pub const UNKNOWN_LOCATION: &str = "Unknown Location";

pub fn time_of_day(hour: u32) -> &'static str {
    match hour {
        0..=5 => "Night",
        6..=11 => "Morning",
        12..=16 => "Afternoon",
        17..=20 => "Evening",
        _ => "Night",
    }
}

/// `"{TimeOfDay} {Run|Bike Ride} in {Location}"`.
pub fn activity_title<Tz: TimeZone>(
    activity: ActivityType,
    at: &DateTime<Tz>,
    location: Option<&str>,
) -> String {
    let location = location
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(UNKNOWN_LOCATION);
    format!("{} {} in {}", time_of_day(at.hour()), activity.title(), location)
}

/// Address block of a reverse geocoding result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressParts {
    pub road: Option<String>,
    pub neighbourhood: Option<String>,
    pub suburb: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
}

impl AddressParts {
    /// First two of road, neighbourhood/suburb, city/town/village.
    pub fn short_name(&self) -> Option<String> {
        let area = self.neighbourhood.as_ref().or(self.suburb.as_ref());
        let place = self
            .city
            .as_ref()
            .or(self.town.as_ref())
            .or(self.village.as_ref());
        let parts: Vec<&str> = [self.road.as_ref(), area, place]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .take(2)
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn hour_boundaries() {
        assert_eq!(time_of_day(5), "Night");
        assert_eq!(time_of_day(6), "Morning");
        assert_eq!(time_of_day(12), "Afternoon");
        assert_eq!(time_of_day(17), "Evening");
        assert_eq!(time_of_day(21), "Night");
    }

    #[test]
    fn title_falls_back_to_unknown_location() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 7, 30, 0).unwrap();
        assert_eq!(
            activity_title(ActivityType::Bike, &at, None),
            "Morning Bike Ride in Unknown Location"
        );
        assert_eq!(
            activity_title(ActivityType::Run, &at, Some("Mission, San Francisco")),
            "Morning Run in Mission, San Francisco"
        );
    }

    #[test]
    fn short_name_takes_first_two_parts() {
        let parts = AddressParts {
            road: Some("Valencia Street".into()),
            suburb: Some("Mission".into()),
            city: Some("San Francisco".into()),
            ..Default::default()
        };
        assert_eq!(parts.short_name().unwrap(), "Valencia Street, Mission");
        assert!(AddressParts::default().short_name().is_none());
    }
}
