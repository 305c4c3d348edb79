//! Daily forecast model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::WeatherCondition;

/// Forecast for one future day
///
/// Sequences of these are chronological and never include the current day; the
/// fetcher drops the provider's leading "today" entry by policy.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub condition: WeatherCondition,
    /// Daily minimum temperature in Celsius
    pub temp_min: f64,
    /// Daily maximum temperature in Celsius
    pub temp_max: f64,
    /// Midpoint of min and max
    pub temp_avg: f64,
}

impl ForecastDay {
    /// Format the temperature span, e.g. "24.0°C – 31.5°C"
    #[must_use]
    pub fn format_range(&self) -> String {
        format!("{:.1}°C – {:.1}°C", self.temp_min, self.temp_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions;

    #[test]
    fn test_format_range() {
        let day = ForecastDay {
            date: NaiveDate::from_ymd_opt(2026, 8, 26).unwrap(),
            condition: conditions::normalize(61),
            temp_min: 24.0,
            temp_max: 31.5,
            temp_avg: 27.75,
        };
        assert_eq!(day.format_range(), "24.0°C – 31.5°C");
    }
}
