//! Weather condition and current-snapshot models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Coordinate;

/// Broad weather classification used across the whole engine
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ConditionCategory {
    Clear,
    Clouds,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
}

/// Normalized weather condition
///
/// Instances are produced only by [`crate::conditions::normalize`]; every
/// condition in the system traces back to exactly one entry of that table.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherCondition {
    pub category: ConditionCategory,
    pub description: String,
    pub icon_key: String,
}

/// Current observed conditions at a place
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CurrentSnapshot {
    pub coordinate: Coordinate,
    /// Display name; `"Unknown Location"` until a real name is resolved
    pub place_name: String,
    /// ISO 3166-1 alpha-2, may be empty pending resolution
    pub country_code: String,
    pub condition: WeatherCondition,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Equal to `temperature`: the upstream provider has no independent
    /// feels-like measurement
    pub feels_like: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Wind speed in km/h
    pub wind_speed: f64,
    /// Mean sea-level pressure in hPa
    pub pressure: f64,
    /// Visibility in kilometers
    pub visibility_km: f64,
    pub observed_at: DateTime<Utc>,
}

impl CurrentSnapshot {
    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temperature)
    }

    /// Format the place line, e.g. "Manila, PH"
    #[must_use]
    pub fn format_place(&self) -> String {
        if self.country_code.is_empty() {
            self.place_name.clone()
        } else {
            format!("{}, {}", self.place_name, self.country_code)
        }
    }
}
