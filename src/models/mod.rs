//! Data models for the Skycast engine
//!
//! Core domain models organized by concern:
//! - Location: coordinates, place candidates and the gazetteer
//! - Weather: normalized conditions and current snapshots
//! - Forecast: daily forecast entries

pub mod forecast;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use forecast::ForecastDay;
pub use location::{Coordinate, GazetteerEntry, PlaceCandidate, RankedCandidate, ResolvedPlace};
pub use weather::{ConditionCategory, CurrentSnapshot, WeatherCondition};
