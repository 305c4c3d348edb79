//! Nominatim geocoding
//!
//! Free-text place search and coordinate-to-name reverse lookup. Reverse
//! requests are paced with a fixed delay because the public Nominatim instance
//! throttles bursty clients.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::config::GeocodingConfig;
use crate::models::{Coordinate, PlaceCandidate, ResolvedPlace};
use crate::{Result, SkycastError};

/// Maximum number of candidates consumed from a search response
const SEARCH_LIMIT: usize = 5;

/// Place search and reverse lookup
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    /// Search for places matching a free-text query, best match first
    async fn search(&self, query: &str) -> Result<Vec<PlaceCandidate>>;

    /// Resolve a coordinate to its place name
    ///
    /// An empty [`ResolvedPlace`] means nothing matched; that is an answer,
    /// not an error.
    async fn reverse(&self, coordinate: Coordinate) -> Result<ResolvedPlace>;

    /// First search candidate, or `NotFound` when the query matches nothing
    async fn best_match(&self, query: &str) -> Result<PlaceCandidate> {
        self.search(query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SkycastError::not_found(query))
    }
}

/// Nominatim client with retrying middleware
#[derive(Clone)]
pub struct GeoClient {
    http: ClientWithMiddleware,
    base_url: String,
    reverse_pacing: Duration,
}

impl GeoClient {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| SkycastError::provider(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(2);
        let http = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            reverse_pacing: Duration::from_millis(config.reverse_pacing_ms),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(SkycastError::provider(format!(
                "Geocoding request failed with status {}",
                response.status()
            )));
        }
        response.json().await.map_err(|e| {
            SkycastError::provider(format!("Invalid geocoding response body: {e}"))
        })
    }
}

#[async_trait]
impl GeocodeProvider for GeoClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<PlaceCandidate>> {
        let url = format!(
            "{}/search?q={}&format=json&limit={}&addressdetails=1",
            self.base_url,
            urlencoding::encode(query),
            SEARCH_LIMIT
        );
        debug!("Searching places: {}", url);

        let places: Vec<nominatim::Place> = self.get_json(&url).await?;
        let candidates: Vec<PlaceCandidate> = places
            .into_iter()
            .filter_map(nominatim::Place::into_candidate)
            .take(SEARCH_LIMIT)
            .collect();

        if candidates.is_empty() {
            warn!("No geocoding results for '{}'", query);
        } else {
            info!("Found {} candidates for '{}'", candidates.len(), query);
        }
        Ok(candidates)
    }

    #[instrument(skip(self), fields(coordinate = %coordinate.format()))]
    async fn reverse(&self, coordinate: Coordinate) -> Result<ResolvedPlace> {
        tokio::time::sleep(self.reverse_pacing).await;

        let url = format!(
            "{}/reverse?lat={}&lon={}&format=json&addressdetails=1",
            self.base_url, coordinate.latitude, coordinate.longitude
        );
        debug!("Reverse lookup: {}", url);

        let place: nominatim::ReversePlace = self.get_json(&url).await?;
        let resolved = place.into_resolved();
        if resolved.is_empty() {
            debug!("No reverse match at {}", coordinate.format());
        }
        Ok(resolved)
    }
}

/// Wire format of the Nominatim search and reverse endpoints
mod nominatim {
    use serde::Deserialize;

    use crate::models::{Coordinate, PlaceCandidate, ResolvedPlace};

    #[derive(Debug, Deserialize)]
    pub struct Place {
        pub lat: String,
        pub lon: String,
        pub name: Option<String>,
        pub address: Option<Address>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct Address {
        pub city: Option<String>,
        pub town: Option<String>,
        pub village: Option<String>,
        pub municipality: Option<String>,
        pub county: Option<String>,
        pub state: Option<String>,
        pub country_code: Option<String>,
    }

    impl Address {
        /// Most specific populated-place component available
        fn place_name(&mut self) -> Option<String> {
            self.city
                .take()
                .or_else(|| self.town.take())
                .or_else(|| self.village.take())
                .or_else(|| self.municipality.take())
        }
    }

    impl Place {
        pub fn into_candidate(self) -> Option<PlaceCandidate> {
            let latitude: f64 = self.lat.parse().ok()?;
            let longitude: f64 = self.lon.parse().ok()?;
            let mut address = self.address.unwrap_or_default();

            Some(PlaceCandidate {
                name: address
                    .place_name()
                    .or(self.name)
                    .unwrap_or_default(),
                country_code: address
                    .country_code
                    .take()
                    .map(|code| code.to_uppercase())
                    .unwrap_or_default(),
                admin_state: address.state.take(),
                coordinate: Coordinate::new(latitude, longitude),
            })
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct ReversePlace {
        pub address: Option<Address>,
    }

    impl ReversePlace {
        pub fn into_resolved(self) -> ResolvedPlace {
            let Some(mut address) = self.address else {
                return ResolvedPlace::default();
            };
            ResolvedPlace {
                name: address
                    .place_name()
                    .or_else(|| address.county.take())
                    .unwrap_or_default(),
                country_code: address
                    .country_code
                    .take()
                    .map(|code| code.to_uppercase())
                    .unwrap_or_default(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::nominatim::{Place, ReversePlace};
    use super::*;

    #[test]
    fn test_candidate_prefers_city_over_fallback_name() {
        let place: Place = serde_json::from_value(serde_json::json!({
            "lat": "14.5995",
            "lon": "120.9842",
            "name": "Metro Manila",
            "address": {
                "city": "Manila",
                "state": "Metro Manila",
                "country_code": "ph"
            }
        }))
        .unwrap();

        let candidate = place.into_candidate().unwrap();
        assert_eq!(candidate.name, "Manila");
        assert_eq!(candidate.country_code, "PH");
        assert_eq!(candidate.admin_state.as_deref(), Some("Metro Manila"));
        assert!((candidate.coordinate.latitude - 14.5995).abs() < 1e-9);
    }

    #[test]
    fn test_candidate_falls_back_through_address_chain() {
        let place: Place = serde_json::from_value(serde_json::json!({
            "lat": "14.1667",
            "lon": "121.2333",
            "name": "Los Baños",
            "address": {
                "municipality": "Los Baños",
                "country_code": "ph"
            }
        }))
        .unwrap();
        assert_eq!(place.into_candidate().unwrap().name, "Los Baños");

        let bare: Place = serde_json::from_value(serde_json::json!({
            "lat": "14.0",
            "lon": "121.0",
            "name": "Some Landmark"
        }))
        .unwrap();
        let candidate = bare.into_candidate().unwrap();
        assert_eq!(candidate.name, "Some Landmark");
        assert_eq!(candidate.country_code, "");
        assert!(candidate.admin_state.is_none());
    }

    #[test]
    fn test_candidate_rejects_unparseable_coordinates() {
        let place: Place = serde_json::from_value(serde_json::json!({
            "lat": "not-a-number",
            "lon": "121.0"
        }))
        .unwrap();
        assert!(place.into_candidate().is_none());
    }

    #[test]
    fn test_reverse_resolves_place() {
        let place: ReversePlace = serde_json::from_value(serde_json::json!({
            "address": {
                "town": "Tagaytay",
                "country_code": "ph"
            }
        }))
        .unwrap();
        let resolved = place.into_resolved();
        assert_eq!(resolved.name, "Tagaytay");
        assert_eq!(resolved.country_code, "PH");
    }

    #[test]
    fn test_reverse_without_address_is_empty() {
        let place: ReversePlace = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(place.into_resolved().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_best_match_on_empty_search_is_not_found() {
        struct Empty;

        #[async_trait]
        impl GeocodeProvider for Empty {
            async fn search(&self, _query: &str) -> Result<Vec<PlaceCandidate>> {
                Ok(Vec::new())
            }
            async fn reverse(&self, _coordinate: Coordinate) -> Result<ResolvedPlace> {
                Ok(ResolvedPlace::default())
            }
        }

        let err = Empty.best_match("Atlantis").await.unwrap_err();
        assert!(matches!(err, SkycastError::NotFound { .. }));
    }
}
