//! Skycast - weather focus resolution engine
//!
//! This library resolves a geographic point (free-text search, coordinates or a
//! device position) into current conditions, a multi-day forecast and a ranked
//! set of nearby-city snapshots, backed by Open-Meteo and Nominatim.

pub mod api;
pub mod conditions;
pub mod config;
pub mod error;
pub mod focus;
pub mod gazetteer;
pub mod geo;
pub mod geocode;
pub mod models;
pub mod nearby;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use conditions::normalize;
pub use config::SkycastConfig;
pub use error::SkycastError;
pub use focus::{FocusService, FocusSession, FocusState, SessionPhase};
pub use geocode::{GeoClient, GeocodeProvider};
pub use models::{
    Coordinate, CurrentSnapshot, ForecastDay, GazetteerEntry, PlaceCandidate, RankedCandidate,
    ResolvedPlace, WeatherCondition,
};
pub use nearby::{fetch_all, rank};
pub use weather::{WeatherClient, WeatherProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, SkycastError>;
