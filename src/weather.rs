//! Open-Meteo weather fetching
//!
//! Retrieves current conditions plus a daily series in a single request and
//! shapes them into the internal snapshot and forecast models. Retries on
//! transient failures are handled by the HTTP middleware stack, not here.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use tracing::{debug, info, instrument};

use crate::config::WeatherConfig;
use crate::models::{Coordinate, CurrentSnapshot, ForecastDay};
use crate::{Result, SkycastError, conditions};

/// Name stamped on a snapshot when no place name is known yet
pub const UNKNOWN_PLACE: &str = "Unknown Location";

/// Number of future days kept from the provider's daily series
const FORECAST_DAYS: usize = 5;

/// Visibility assumed when the provider omits the measurement, in kilometers
const DEFAULT_VISIBILITY_KM: f64 = 10.0;

/// Source of current conditions and forecasts
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch current conditions and the future-day forecast for a coordinate
    ///
    /// `known_name` and `known_country` label the snapshot when the caller
    /// already knows the place; an empty name falls back to [`UNKNOWN_PLACE`].
    async fn current_and_forecast(
        &self,
        coordinate: Coordinate,
        known_name: &str,
        known_country: &str,
    ) -> Result<(CurrentSnapshot, Vec<ForecastDay>)>;

    /// Current conditions only
    async fn current(
        &self,
        coordinate: Coordinate,
        known_name: &str,
        known_country: &str,
    ) -> Result<CurrentSnapshot> {
        let (snapshot, _) = self
            .current_and_forecast(coordinate, known_name, known_country)
            .await?;
        Ok(snapshot)
    }
}

/// Open-Meteo client with retrying middleware
#[derive(Clone)]
pub struct WeatherClient {
    http: ClientWithMiddleware,
    base_url: String,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(format!("Skycast/{}", crate::VERSION))
            .build()
            .map_err(|e| SkycastError::provider(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let http = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    #[instrument(skip(self, known_name, known_country), fields(coordinate = %coordinate.format()))]
    async fn current_and_forecast(
        &self,
        coordinate: Coordinate,
        known_name: &str,
        known_country: &str,
    ) -> Result<(CurrentSnapshot, Vec<ForecastDay>)> {
        let url = format!(
            "{}/forecast?latitude={}&longitude={}\
             &current=temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m,pressure_msl,visibility\
             &daily=weather_code,temperature_2m_max,temperature_2m_min\
             &timezone=auto&forecast_days=7",
            self.base_url, coordinate.latitude, coordinate.longitude
        );
        debug!("Requesting weather: {}", url);

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(SkycastError::provider(format!(
                "Weather request failed with status {}",
                response.status()
            )));
        }

        let body: open_meteo::ForecastResponse = response.json().await.map_err(|e| {
            SkycastError::provider(format!("Invalid weather response body: {e}"))
        })?;

        let current = body.current.ok_or_else(|| {
            SkycastError::provider("Weather response is missing current conditions")
        })?;
        let snapshot = build_snapshot(coordinate, known_name, known_country, &current);
        let forecast = body.daily.as_ref().map(extract_forecast).unwrap_or_default();

        info!(
            "Fetched current conditions and {} forecast days for {}",
            forecast.len(),
            snapshot.place_name
        );
        Ok((snapshot, forecast))
    }
}

fn build_snapshot(
    coordinate: Coordinate,
    known_name: &str,
    known_country: &str,
    current: &open_meteo::CurrentData,
) -> CurrentSnapshot {
    let place_name = if known_name.is_empty() {
        UNKNOWN_PLACE.to_string()
    } else {
        known_name.to_string()
    };

    CurrentSnapshot {
        coordinate,
        place_name,
        country_code: known_country.to_string(),
        condition: conditions::normalize(current.weather_code),
        temperature: current.temperature,
        // the provider has no independent feels-like measurement
        feels_like: current.temperature,
        humidity: current.humidity,
        wind_speed: current.wind_speed,
        pressure: current.pressure.round(),
        visibility_km: current
            .visibility
            .map_or(DEFAULT_VISIBILITY_KM, |meters| (meters / 1000.0).round()),
        observed_at: Utc::now(),
    }
}

/// Shape the provider's daily series into future-day forecasts
///
/// The series starts with the current day, which is dropped. Up to
/// [`FORECAST_DAYS`] following days are kept; the first day with any missing
/// field truncates the result instead of failing the whole call.
fn extract_forecast(daily: &open_meteo::DailyData) -> Vec<ForecastDay> {
    let mut days = Vec::new();

    for index in 1..daily.time.len().min(FORECAST_DAYS + 1) {
        let Ok(date) = NaiveDate::parse_from_str(&daily.time[index], "%Y-%m-%d") else {
            break;
        };
        let code = pick(daily.weather_code.as_deref(), index);
        let temp_max = pick(daily.temperature_max.as_deref(), index);
        let temp_min = pick(daily.temperature_min.as_deref(), index);
        let (Some(code), Some(temp_max), Some(temp_min)) = (code, temp_max, temp_min) else {
            break;
        };

        days.push(ForecastDay {
            date,
            condition: conditions::normalize(code),
            temp_min,
            temp_max,
            temp_avg: (temp_min + temp_max) / 2.0,
        });
    }

    days
}

fn pick<T: Copy>(series: Option<&[Option<T>]>, index: usize) -> Option<T> {
    series.and_then(|values| values.get(index).copied().flatten())
}

/// Wire format of the Open-Meteo forecast endpoint
mod open_meteo {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub current: Option<CurrentData>,
        pub daily: Option<DailyData>,
    }

    #[derive(Debug, Deserialize)]
    pub struct CurrentData {
        #[serde(rename = "temperature_2m")]
        pub temperature: f64,
        #[serde(rename = "relative_humidity_2m")]
        pub humidity: f64,
        pub weather_code: u16,
        #[serde(rename = "wind_speed_10m")]
        pub wind_speed: f64,
        #[serde(rename = "pressure_msl")]
        pub pressure: f64,
        /// Meters; not reported for every coordinate
        pub visibility: Option<f64>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct DailyData {
        #[serde(default)]
        pub time: Vec<String>,
        pub weather_code: Option<Vec<Option<u16>>>,
        #[serde(rename = "temperature_2m_max")]
        pub temperature_max: Option<Vec<Option<f64>>>,
        #[serde(rename = "temperature_2m_min")]
        pub temperature_min: Option<Vec<Option<f64>>>,
    }
}
