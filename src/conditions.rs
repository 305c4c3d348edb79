//! WMO weather-code normalization
//!
//! Single source of truth for translating the provider's numeric weather
//! classification into the internal condition vocabulary. Every consumer
//! (current weather, forecast, nearby panel) goes through [`normalize`]; the
//! table must never be duplicated at a call site.

use crate::models::{ConditionCategory, WeatherCondition};

/// Known WMO interpretation codes with their category, description and icon key
const CODE_TABLE: &[(u16, ConditionCategory, &str, &str)] = &[
    (0, ConditionCategory::Clear, "clear sky", "01d"),
    (1, ConditionCategory::Clear, "mainly clear", "01d"),
    (2, ConditionCategory::Clouds, "partly cloudy", "02d"),
    (3, ConditionCategory::Clouds, "overcast", "04d"),
    (45, ConditionCategory::Fog, "foggy", "50d"),
    (48, ConditionCategory::Fog, "depositing rime fog", "50d"),
    (51, ConditionCategory::Drizzle, "light drizzle", "09d"),
    (53, ConditionCategory::Drizzle, "moderate drizzle", "09d"),
    (55, ConditionCategory::Drizzle, "dense drizzle", "09d"),
    (56, ConditionCategory::Drizzle, "light freezing drizzle", "09d"),
    (57, ConditionCategory::Drizzle, "dense freezing drizzle", "09d"),
    (61, ConditionCategory::Rain, "slight rain", "10d"),
    (63, ConditionCategory::Rain, "moderate rain", "10d"),
    (65, ConditionCategory::Rain, "heavy rain", "10d"),
    (66, ConditionCategory::Rain, "light freezing rain", "10d"),
    (67, ConditionCategory::Rain, "heavy freezing rain", "10d"),
    (71, ConditionCategory::Snow, "slight snow fall", "13d"),
    (73, ConditionCategory::Snow, "moderate snow fall", "13d"),
    (75, ConditionCategory::Snow, "heavy snow fall", "13d"),
    (77, ConditionCategory::Snow, "snow grains", "13d"),
    (80, ConditionCategory::Rain, "slight rain showers", "09d"),
    (81, ConditionCategory::Rain, "moderate rain showers", "09d"),
    (82, ConditionCategory::Rain, "violent rain showers", "09d"),
    (85, ConditionCategory::Snow, "slight snow showers", "13d"),
    (86, ConditionCategory::Snow, "heavy snow showers", "13d"),
    (95, ConditionCategory::Thunderstorm, "thunderstorm", "11d"),
    (
        96,
        ConditionCategory::Thunderstorm,
        "thunderstorm with slight hail",
        "11d",
    ),
    (
        99,
        ConditionCategory::Thunderstorm,
        "thunderstorm with heavy hail",
        "11d",
    ),
];

/// Normalize a provider weather code into the internal condition vocabulary
///
/// Total over all of `u16`: unknown codes fall back to the clear-sky triple so
/// that new provider codes degrade gracefully instead of breaking rendering.
#[must_use]
pub fn normalize(code: u16) -> WeatherCondition {
    let (category, description, icon_key) = CODE_TABLE
        .iter()
        .find(|(c, _, _, _)| *c == code)
        .map_or((ConditionCategory::Clear, "clear sky", "01d"), |entry| {
            (entry.1, entry.2, entry.3)
        });

    WeatherCondition {
        category,
        description: description.to_string(),
        icon_key: icon_key.to_string(),
    }
}

/// Map an icon key to its display asset URL (presentational collaborator)
#[must_use]
pub fn icon_url(icon_key: &str) -> String {
    format!("https://openweathermap.org/img/wn/{icon_key}@2x.png")
}
