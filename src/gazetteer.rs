//! Static nearby-city gazetteer
//!
//! Hand-curated reference list for one country, consumed only by the nearby
//! ranker. Swapping the slice passed to [`crate::nearby::rank`] is the
//! supported way to change geographic coverage.

use crate::models::{Coordinate, GazetteerEntry};

/// Philippine cities: name, latitude, longitude
const PHILIPPINE_CITIES: &[(&str, f64, f64)] = &[
    // Metro Manila
    ("Manila", 14.5995, 120.9842),
    ("Quezon City", 14.6760, 121.0437),
    ("Makati", 14.5547, 121.0244),
    ("Pasig", 14.5764, 121.0851),
    ("Taguig", 14.5176, 121.0509),
    ("Mandaluyong", 14.5794, 121.0359),
    ("Pasay", 14.5378, 120.9969),
    ("Marikina", 14.6507, 121.1029),
    ("Las Piñas", 14.4500, 120.9833),
    ("Parañaque", 14.4793, 121.0198),
    ("Valenzuela", 14.7000, 120.9833),
    ("Caloocan", 14.6548, 120.9847),
    ("Muntinlupa", 14.4081, 121.0415),
    ("San Juan", 14.6019, 121.0285),
    // Nearby provinces
    ("Antipolo", 14.5886, 121.1753),
    ("Cavite City", 14.4793, 120.8970),
    ("Bacoor", 14.4594, 120.9250),
    ("Imus", 14.4297, 120.9367),
    ("Dasmariñas", 14.3294, 120.9367),
    ("Tagaytay", 14.0969, 120.9330),
    ("Calamba", 14.2117, 121.1653),
    ("Los Baños", 14.1667, 121.2333),
    ("San Pedro", 14.3589, 121.0567),
    // Northern Luzon
    ("Baguio", 16.4023, 120.5960),
    ("Dagupan", 16.0431, 120.3331),
    ("Tarlac City", 15.4800, 120.6000),
    ("Olongapo", 14.8292, 120.2828),
    ("Angeles", 15.1472, 120.5847),
    // Central Visayas
    ("Cebu City", 10.3157, 123.8854),
    ("Mandaue", 10.3236, 123.9222),
    ("Lapu-Lapu", 10.3103, 123.9494),
    ("Talisay", 10.2447, 123.8497),
    // Western Visayas
    ("Iloilo City", 10.7202, 122.5621),
    ("Bacolod", 10.6765, 122.9509),
    // Mindanao
    ("Davao City", 7.1907, 125.4553),
    ("Cagayan de Oro", 8.4542, 124.6319),
    ("Zamboanga City", 6.9214, 122.0790),
    ("General Santos", 6.1128, 125.1717),
    ("Butuan", 8.9492, 125.5436),
    // Bicol
    ("Naga", 13.6192, 123.1814),
    ("Legazpi", 13.1394, 123.7444),
];

/// The default gazetteer used by the nearby-city panel
#[must_use]
pub fn default_gazetteer() -> Vec<GazetteerEntry> {
    PHILIPPINE_CITIES
        .iter()
        .map(|&(name, latitude, longitude)| GazetteerEntry {
            name: name.to_string(),
            country_code: "PH".to_string(),
            coordinate: Coordinate::new(latitude, longitude),
        })
        .collect()
}
