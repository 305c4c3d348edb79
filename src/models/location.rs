//! Location models: coordinates, place candidates and gazetteer entries

use serde::{Deserialize, Serialize};

/// A geographic point in decimal degrees
///
/// Latitude is expected in [-90, 90] and longitude in [-180, 180]; both are
/// validated at the input-parsing boundary, not here.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Format as a short coordinate string for display and log output
    #[must_use]
    pub fn format(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A candidate place returned by the geocoding search
///
/// Only the coordinate is guaranteed non-empty; name and country may be blank
/// when the provider's address breakdown has no usable components.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlaceCandidate {
    pub name: String,
    pub country_code: String,
    pub admin_state: Option<String>,
    pub coordinate: Coordinate,
}

/// Best-matching place for a coordinate, from reverse geocoding
///
/// Both fields are empty when no place matched; that is an answer, not an
/// error.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ResolvedPlace {
    pub name: String,
    pub country_code: String,
}

impl ResolvedPlace {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

/// A named place in the static nearby-city reference list
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GazetteerEntry {
    pub name: String,
    pub country_code: String,
    pub coordinate: Coordinate,
}

/// A gazetteer entry selected by the nearby ranker
///
/// `distance_km` is present whenever ranking had a focus coordinate to measure
/// from; `snapshot` is attached by the aggregator and stays absent when the
/// fetch for this candidate failed.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RankedCandidate {
    pub entry: GazetteerEntry,
    pub distance_km: Option<f64>,
    pub snapshot: Option<crate::models::CurrentSnapshot>,
}

impl RankedCandidate {
    #[must_use]
    pub fn new(entry: GazetteerEntry, distance_km: Option<f64>) -> Self {
        Self {
            entry,
            distance_km,
            snapshot: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_format() {
        let coordinate = Coordinate::new(14.5995, 120.9842);
        assert_eq!(coordinate.format(), "14.5995, 120.9842");
    }

    #[test]
    fn test_resolved_place_empty() {
        assert!(ResolvedPlace::default().is_empty());
        let place = ResolvedPlace {
            name: "Manila".to_string(),
            country_code: "PH".to_string(),
        };
        assert!(!place.is_empty());
    }
}
