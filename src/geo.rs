//! Great-circle distance between coordinates

use haversine::{Location as HaversineLocation, Units, distance};

use crate::models::Coordinate;

/// Distance between two coordinates in kilometers
///
/// Spherical haversine with the 6371 km mean Earth radius.
#[must_use]
pub fn distance_km(from: &Coordinate, to: &Coordinate) -> f64 {
    let from_haversine = HaversineLocation {
        latitude: from.latitude,
        longitude: from.longitude,
    };
    let to_haversine = HaversineLocation {
        latitude: to.latitude,
        longitude: to.longitude,
    };
    distance(from_haversine, to_haversine, Units::Kilometers)
}
