//! Error types and handling for the Skycast engine

use thiserror::Error;

/// Main error type for the Skycast engine
///
/// Upstream failures are deliberately coarse: a non-success status, a malformed
/// body and a transport failure all collapse into [`SkycastError::Provider`],
/// since the caller's remedy is identical (skip or retry).
#[derive(Error, Debug)]
pub enum SkycastError {
    /// Upstream weather or geocoding call failed or returned malformed data
    #[error("Provider error: {message}")]
    Provider { message: String },

    /// A search query matched zero places
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// The device position could not be obtained
    #[error("Location unavailable: {message}")]
    LocationUnavailable { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl SkycastError {
    /// Create a new provider error
    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new location-unavailable error
    pub fn location_unavailable<S: Into<String>>(message: S) -> Self {
        Self::LocationUnavailable {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SkycastError::Provider { .. } => {
                "Unable to reach the weather service. Please check your internet connection."
                    .to_string()
            }
            SkycastError::NotFound { message } => {
                format!("No matching place: {message}")
            }
            SkycastError::LocationUnavailable { .. } => {
                "Unable to determine your location. Enable location access or search for a city."
                    .to_string()
            }
            SkycastError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for SkycastError {
    fn from(err: reqwest::Error) -> Self {
        SkycastError::provider(err.to_string())
    }
}

impl From<reqwest_middleware::Error> for SkycastError {
    fn from(err: reqwest_middleware::Error) -> Self {
        SkycastError::provider(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let provider_err = SkycastError::provider("connection refused");
        assert!(matches!(provider_err, SkycastError::Provider { .. }));

        let not_found_err = SkycastError::not_found("Atlantis");
        assert!(matches!(not_found_err, SkycastError::NotFound { .. }));

        let location_err = SkycastError::location_unavailable("permission denied");
        assert!(matches!(
            location_err,
            SkycastError::LocationUnavailable { .. }
        ));
    }

    #[test]
    fn test_user_messages() {
        let provider_err = SkycastError::provider("test");
        assert!(provider_err.user_message().contains("weather service"));

        let not_found_err = SkycastError::not_found("Atlantis");
        assert!(not_found_err.user_message().contains("Atlantis"));

        let location_err = SkycastError::location_unavailable("test");
        assert!(location_err.user_message().contains("location"));
    }
}
