use std::sync::LazyLock;

use axum::{
    Router,
    extract::Query,
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::SkycastConfig;
use crate::geocode::{GeoClient, GeocodeProvider};
use crate::models::{Coordinate, CurrentSnapshot, ForecastDay, GazetteerEntry, PlaceCandidate, RankedCandidate};
use crate::weather::{WeatherClient, WeatherProvider};
use crate::{SkycastError, gazetteer, nearby};

static CONTEXT: LazyLock<ApiContext> = LazyLock::new(|| {
    let config = SkycastConfig::load().unwrap_or_else(|err| {
        warn!("Falling back to default configuration: {}", err);
        SkycastConfig::default()
    });
    ApiContext::new(&config).expect("Failed to initialize API clients")
});

struct ApiContext {
    weather: WeatherClient,
    geocode: GeoClient,
    gazetteer: Vec<GazetteerEntry>,
}

impl ApiContext {
    fn new(config: &SkycastConfig) -> crate::Result<Self> {
        Ok(Self {
            weather: WeatherClient::new(&config.weather)?,
            geocode: GeoClient::new(&config.geocoding)?,
            gazetteer: gazetteer::default_gazetteer(),
        })
    }
}

#[derive(Deserialize)]
struct FocusQuery {
    q: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
}

#[derive(Deserialize)]
struct NearbyQuery {
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Serialize)]
pub struct FocusResponse {
    pub current: CurrentSnapshot,
    pub forecast: Vec<ForecastDay>,
}

pub fn router() -> Router {
    Router::new()
        .route("/focus", get(get_focus))
        .route("/search", get(get_search))
        .route("/nearby", get(get_nearby))
}

async fn get_focus(Query(params): Query<FocusQuery>) -> Result<Json<FocusResponse>, StatusCode> {
    match (params.q, params.lat, params.lon) {
        (Some(query), _, _) => {
            let place = CONTEXT
                .geocode
                .best_match(&query)
                .await
                .map_err(error_status)?;
            let (current, forecast) = CONTEXT
                .weather
                .current_and_forecast(place.coordinate, &place.name, &place.country_code)
                .await
                .map_err(error_status)?;
            Ok(Json(FocusResponse { current, forecast }))
        }
        (None, Some(lat), Some(lon)) => {
            let coordinate = Coordinate::new(lat, lon);
            let (fetched, resolved) = tokio::join!(
                CONTEXT.weather.current_and_forecast(coordinate, "", ""),
                CONTEXT.geocode.reverse(coordinate)
            );

            let (mut current, forecast) = fetched.map_err(error_status)?;
            match resolved {
                Ok(place) if !place.is_empty() => {
                    current.place_name = place.name;
                    current.country_code = place.country_code;
                }
                Ok(_) => {}
                Err(err) => warn!("Reverse lookup failed, keeping fallback name: {}", err),
            }
            Ok(Json(FocusResponse { current, forecast }))
        }
        _ => Err(StatusCode::BAD_REQUEST),
    }
}

async fn get_search(
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<PlaceCandidate>>, StatusCode> {
    let candidates = CONTEXT
        .geocode
        .search(&params.q)
        .await
        .map_err(error_status)?;
    Ok(Json(candidates))
}

async fn get_nearby(Query(params): Query<NearbyQuery>) -> Json<Vec<RankedCandidate>> {
    let focus = match (params.lat, params.lon) {
        (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
        _ => None,
    };
    let ranked = nearby::rank(focus, &CONTEXT.gazetteer);
    Json(nearby::fetch_all(&CONTEXT.weather, ranked).await)
}

fn error_status(err: SkycastError) -> StatusCode {
    match err {
        SkycastError::NotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    }
}
