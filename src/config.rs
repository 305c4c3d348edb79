//! Configuration management for the Skycast engine
//!
//! Loads configuration from an optional TOML file and `SKYCAST_`-prefixed
//! environment variables, with serde defaults and validation.

use crate::SkycastError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkycastConfig {
    /// Weather provider configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Geocoding provider configuration
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Weather provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL for the Open-Meteo forecast API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Maximum transient-error retries, handled by the HTTP middleware
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Geocoding provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL for the Nominatim API
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// User agent sent to Nominatim (required by its usage policy)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Delay before each reverse-geocode request; the collaborator is
    /// rate-sensitive and must not see bursts
    #[serde(default = "default_reverse_pacing_ms")]
    pub reverse_pacing_ms: u64,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    format!("Skycast/{}", env!("CARGO_PKG_VERSION"))
}

fn default_reverse_pacing_ms() -> u64 {
    1000
}

fn default_timeout() -> u32 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            user_agent: default_user_agent(),
            reverse_pacing_ms: default_reverse_pacing_ms(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for SkycastConfig {
    fn default() -> Self {
        Self {
            weather: WeatherConfig::default(),
            geocoding: GeocodingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SkycastConfig {
    /// Load configuration from the default file location and environment
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from a specific path, falling back to defaults
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("SKYCAST")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: SkycastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Default configuration file path
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("skycast").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.weather.timeout_seconds == 0 || self.weather.timeout_seconds > 300 {
            return Err(SkycastError::config(
                "Weather timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if self.weather.max_retries > 10 {
            return Err(SkycastError::config("Weather max retries cannot exceed 10").into());
        }

        if self.geocoding.timeout_seconds == 0 || self.geocoding.timeout_seconds > 300 {
            return Err(SkycastError::config(
                "Geocoding timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        for (label, url) in [
            ("weather", &self.weather.base_url),
            ("geocoding", &self.geocoding.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SkycastError::config(format!(
                    "{label} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(SkycastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(SkycastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}
