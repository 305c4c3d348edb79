//! Focus resolution orchestration
//!
//! Drives weather fetching and two-phase place-name resolution for the single
//! focus location of a session. Every resolution attempt gets a fresh request
//! epoch; results are only committed while their epoch is still current, so a
//! slow reverse lookup from a superseded request can never overwrite the state
//! of a newer one.

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::geocode::GeocodeProvider;
use crate::models::{
    Coordinate, CurrentSnapshot, ForecastDay, GazetteerEntry, RankedCandidate, ResolvedPlace,
};
use crate::weather::WeatherProvider;
use crate::{Result, SkycastError, nearby};

/// Committed output for the current focus location
#[derive(Debug, Clone, Serialize)]
pub struct FocusState {
    pub coordinate: Coordinate,
    pub current: CurrentSnapshot,
    pub forecast: Vec<ForecastDay>,
    /// Epoch of the request that produced this state
    pub request_epoch: u64,
}

/// Lifecycle of the current resolution attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Resolving,
    Ready,
    Failed,
}

/// Epoch-guarded focus state
///
/// All mutators except [`FocusSession::begin`] take the epoch of the request
/// they belong to and are silently ignored when a newer request has started
/// since. The session itself is synchronous; concurrency lives in the service
/// driving it.
#[derive(Debug)]
pub struct FocusSession {
    epoch: u64,
    phase: SessionPhase,
    focus: Option<FocusState>,
    error: Option<String>,
}

impl Default for FocusSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: 0,
            phase: SessionPhase::Idle,
            focus: None,
            error: None,
        }
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn focus(&self) -> Option<&FocusState> {
        self.focus.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start a new request generation; returns the epoch identifying it
    ///
    /// Any previously displayed focus stays visible while the new request
    /// resolves.
    pub fn begin(&mut self) -> u64 {
        self.epoch += 1;
        self.phase = SessionPhase::Resolving;
        self.error = None;
        self.epoch
    }

    /// Commit a resolved focus; ignored unless `epoch` is still current
    pub fn commit(&mut self, epoch: u64, state: FocusState) -> bool {
        if epoch != self.epoch {
            debug!(
                "Discarding stale focus commit (epoch {} superseded by {})",
                epoch, self.epoch
            );
            return false;
        }
        self.focus = Some(state);
        self.phase = SessionPhase::Ready;
        true
    }

    /// Apply a late-arriving place name; ignored unless `epoch` is still
    /// current and the name is non-empty
    pub fn apply_place_name(&mut self, epoch: u64, place: &ResolvedPlace) -> bool {
        if epoch != self.epoch {
            debug!(
                "Discarding stale place name '{}' (epoch {} superseded by {})",
                place.name, epoch, self.epoch
            );
            return false;
        }
        if place.is_empty() {
            // keep the fetcher's fallback name
            return false;
        }
        if let Some(focus) = self.focus.as_mut() {
            focus.current.place_name = place.name.clone();
            focus.current.country_code = place.country_code.clone();
            return true;
        }
        false
    }

    /// Mark the request failed and clear any displayed focus; ignored unless
    /// `epoch` is still current
    pub fn fail(&mut self, epoch: u64, message: impl Into<String>) -> bool {
        if epoch != self.epoch {
            debug!(
                "Discarding stale failure (epoch {} superseded by {})",
                epoch, self.epoch
            );
            return false;
        }
        self.focus = None;
        self.phase = SessionPhase::Failed;
        self.error = Some(message.into());
        true
    }
}

struct PendingName {
    epoch: u64,
    task: JoinHandle<Result<ResolvedPlace>>,
}

/// Drives focus resolution against concrete weather and geocoding providers
///
/// The weather snapshot commits as soon as it arrives; for coordinate-based
/// requests the display name resolves on a background task and is applied
/// later through the session's epoch guard.
pub struct FocusService<W, G> {
    weather: W,
    geocode: G,
    gazetteer: Vec<GazetteerEntry>,
    session: FocusSession,
    pending_names: Vec<PendingName>,
}

impl<W, G> FocusService<W, G>
where
    W: WeatherProvider,
    G: GeocodeProvider + Clone + Send + 'static,
{
    #[must_use]
    pub fn new(weather: W, geocode: G, gazetteer: Vec<GazetteerEntry>) -> Self {
        Self {
            weather,
            geocode,
            gazetteer,
            session: FocusSession::new(),
            pending_names: Vec::new(),
        }
    }

    #[must_use]
    pub fn session(&self) -> &FocusSession {
        &self.session
    }

    /// Focus on a raw coordinate (device position or map selection)
    ///
    /// Spawns the reverse name lookup, awaits only the weather fetch and
    /// commits the snapshot under its fallback name. Call
    /// [`FocusService::settle_pending_names`] to apply resolved names.
    pub async fn focus_coordinate(&mut self, coordinate: Coordinate) -> Result<u64> {
        let epoch = self.session.begin();
        info!(
            "Resolving focus for {} (epoch {})",
            coordinate.format(),
            epoch
        );

        let geocoder = self.geocode.clone();
        let task = tokio::spawn(async move { geocoder.reverse(coordinate).await });
        self.pending_names.push(PendingName { epoch, task });

        match self.weather.current_and_forecast(coordinate, "", "").await {
            Ok((current, forecast)) => {
                self.session.commit(
                    epoch,
                    FocusState {
                        coordinate,
                        current,
                        forecast,
                        request_epoch: epoch,
                    },
                );
                Ok(epoch)
            }
            Err(err) => {
                self.session.fail(epoch, err.user_message());
                Err(err)
            }
        }
    }

    /// Focus on the best match for a free-text query
    ///
    /// The candidate carries its own name, so no reverse lookup is needed.
    pub async fn focus_search(&mut self, query: &str) -> Result<u64> {
        let epoch = self.session.begin();
        info!("Resolving focus for '{}' (epoch {})", query, epoch);

        let place = match self.geocode.best_match(query).await {
            Ok(place) => place,
            Err(err) => {
                self.session.fail(epoch, err.user_message());
                return Err(err);
            }
        };

        match self
            .weather
            .current_and_forecast(place.coordinate, &place.name, &place.country_code)
            .await
        {
            Ok((current, forecast)) => {
                self.session.commit(
                    epoch,
                    FocusState {
                        coordinate: place.coordinate,
                        current,
                        forecast,
                        request_epoch: epoch,
                    },
                );
                Ok(epoch)
            }
            Err(err) => {
                self.session.fail(epoch, err.user_message());
                Err(err)
            }
        }
    }

    /// Record that the device position could not be obtained
    pub fn report_position_failure(&mut self, detail: &str) {
        let epoch = self.session.begin();
        let err = SkycastError::location_unavailable(detail);
        self.session.fail(epoch, err.user_message());
    }

    /// Await outstanding reverse lookups and apply each result through the
    /// epoch guard; results for superseded requests are silently discarded
    pub async fn settle_pending_names(&mut self) {
        let pending: Vec<PendingName> = self.pending_names.drain(..).collect();
        for entry in pending {
            match entry.task.await {
                Ok(Ok(place)) => {
                    self.session.apply_place_name(entry.epoch, &place);
                }
                Ok(Err(err)) => {
                    // the fallback name stays in place
                    debug!("Reverse lookup failed: {}", err);
                }
                Err(err) => {
                    warn!("Reverse lookup task panicked or was cancelled: {}", err);
                }
            }
        }
    }

    /// Ranked nearby-city snapshots around a focus coordinate
    ///
    /// Independent of the epoch machinery: callers pass whichever focus they
    /// are displaying.
    pub async fn nearby(&self, focus: Option<Coordinate>) -> Vec<RankedCandidate> {
        let ranked = nearby::rank(focus, &self.gazetteer);
        nearby::fetch_all(&self.weather, ranked).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlaceCandidate;
    use crate::{SkycastError, conditions};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn snapshot(coordinate: Coordinate, name: &str, country: &str) -> CurrentSnapshot {
        CurrentSnapshot {
            coordinate,
            place_name: if name.is_empty() {
                crate::weather::UNKNOWN_PLACE.to_string()
            } else {
                name.to_string()
            },
            country_code: country.to_string(),
            condition: conditions::normalize(0),
            temperature: 30.0,
            feels_like: 30.0,
            humidity: 70.0,
            wind_speed: 10.0,
            pressure: 1010.0,
            visibility_km: 10.0,
            observed_at: Utc::now(),
        }
    }

    fn state(epoch: u64, name: &str) -> FocusState {
        let coordinate = Coordinate::new(14.6, 121.0);
        FocusState {
            coordinate,
            current: snapshot(coordinate, name, "PH"),
            forecast: Vec::new(),
            request_epoch: epoch,
        }
    }

    #[test]
    fn test_begin_increments_epoch_and_keeps_focus() {
        let mut session = FocusSession::new();
        assert_eq!(session.phase(), SessionPhase::Idle);

        let first = session.begin();
        assert_eq!(first, 1);
        session.commit(first, state(first, "Manila"));
        assert_eq!(session.phase(), SessionPhase::Ready);

        let second = session.begin();
        assert_eq!(second, 2);
        assert_eq!(session.phase(), SessionPhase::Resolving);
        // previous focus stays visible while resolving
        assert_eq!(session.focus().unwrap().current.place_name, "Manila");
    }

    #[test]
    fn test_stale_commit_is_discarded() {
        let mut session = FocusSession::new();
        let first = session.begin();
        let second = session.begin();

        assert!(!session.commit(first, state(first, "Old")));
        assert!(session.focus().is_none());

        assert!(session.commit(second, state(second, "New")));
        assert_eq!(session.focus().unwrap().current.place_name, "New");
    }

    #[test]
    fn test_stale_place_name_is_discarded() {
        let mut session = FocusSession::new();
        let first = session.begin();
        session.commit(first, state(first, "Unknown Location"));
        let second = session.begin();
        session.commit(second, state(second, "Unknown Location"));

        let stale = ResolvedPlace {
            name: "Old Town".to_string(),
            country_code: "PH".to_string(),
        };
        assert!(!session.apply_place_name(first, &stale));

        let fresh = ResolvedPlace {
            name: "New Town".to_string(),
            country_code: "PH".to_string(),
        };
        assert!(session.apply_place_name(second, &fresh));
        assert_eq!(session.focus().unwrap().current.place_name, "New Town");
    }

    #[test]
    fn test_empty_place_name_keeps_fallback() {
        let mut session = FocusSession::new();
        let epoch = session.begin();
        session.commit(epoch, state(epoch, "Unknown Location"));

        assert!(!session.apply_place_name(epoch, &ResolvedPlace::default()));
        assert_eq!(
            session.focus().unwrap().current.place_name,
            "Unknown Location"
        );
    }

    #[test]
    fn test_fail_clears_focus_and_stale_fail_is_discarded() {
        let mut session = FocusSession::new();
        let first = session.begin();
        session.commit(first, state(first, "Manila"));

        assert!(session.fail(first, "weather service down"));
        assert_eq!(session.phase(), SessionPhase::Failed);
        assert!(session.focus().is_none());
        assert_eq!(session.error(), Some("weather service down"));

        let second = session.begin();
        session.commit(second, state(second, "Cebu City"));
        assert!(!session.fail(first, "late failure"));
        assert_eq!(session.phase(), SessionPhase::Ready);
    }

    #[derive(Clone)]
    struct StubWeather {
        fail: bool,
    }

    #[async_trait]
    impl WeatherProvider for StubWeather {
        async fn current_and_forecast(
            &self,
            coordinate: Coordinate,
            known_name: &str,
            known_country: &str,
        ) -> crate::Result<(CurrentSnapshot, Vec<ForecastDay>)> {
            if self.fail {
                return Err(SkycastError::provider("upstream down"));
            }
            Ok((snapshot(coordinate, known_name, known_country), Vec::new()))
        }
    }

    /// Reverse lookups get slower-then-faster names so out-of-order
    /// completion can be simulated under paused time
    #[derive(Clone)]
    struct ScriptedReverse {
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedReverse {
        fn new() -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl GeocodeProvider for ScriptedReverse {
        async fn search(&self, query: &str) -> crate::Result<Vec<PlaceCandidate>> {
            if query == "nowhere" {
                return Ok(Vec::new());
            }
            Ok(vec![PlaceCandidate {
                name: "Cebu City".to_string(),
                country_code: "PH".to_string(),
                admin_state: Some("Cebu".to_string()),
                coordinate: Coordinate::new(10.3157, 123.8854),
            }])
        }

        async fn reverse(&self, _coordinate: Coordinate) -> crate::Result<ResolvedPlace> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(ResolvedPlace {
                    name: "Old Town".to_string(),
                    country_code: "PH".to_string(),
                })
            } else {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(ResolvedPlace {
                    name: "New Town".to_string(),
                    country_code: "PH".to_string(),
                })
            }
        }
    }

    fn service(fail_weather: bool) -> FocusService<StubWeather, ScriptedReverse> {
        FocusService::new(
            StubWeather { fail: fail_weather },
            ScriptedReverse::new(),
            Vec::new(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_coordinate_commits_before_name_resolves() {
        let mut service = service(false);
        let epoch = service
            .focus_coordinate(Coordinate::new(14.6, 121.0))
            .await
            .unwrap();

        assert_eq!(epoch, 1);
        assert_eq!(service.session().phase(), SessionPhase::Ready);
        // the name has not settled yet
        assert_eq!(
            service.session().focus().unwrap().current.place_name,
            "Unknown Location"
        );

        service.settle_pending_names().await;
        assert_eq!(
            service.session().focus().unwrap().current.place_name,
            "Old Town"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_reverse_from_superseded_request_is_discarded() {
        let mut service = service(false);
        // first request gets the slow reverse lookup
        service
            .focus_coordinate(Coordinate::new(14.0, 121.0))
            .await
            .unwrap();
        // second request supersedes it before any name settles
        let second = service
            .focus_coordinate(Coordinate::new(10.0, 123.0))
            .await
            .unwrap();

        service.settle_pending_names().await;

        let focus = service.session().focus().unwrap();
        assert_eq!(focus.request_epoch, second);
        // the slow "Old Town" result arrived for epoch 1 and was dropped
        assert_eq!(focus.current.place_name, "New Town");
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_search_uses_candidate_name() {
        let mut service = service(false);
        service.focus_search("Cebu").await.unwrap();

        let focus = service.session().focus().unwrap();
        assert_eq!(focus.current.place_name, "Cebu City");
        assert_eq!(focus.current.country_code, "PH");
        // no reverse lookup was scheduled
        service.settle_pending_names().await;
        assert_eq!(
            service.session().focus().unwrap().current.place_name,
            "Cebu City"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_search_miss_fails_session() {
        let mut service = service(false);
        let err = service.focus_search("nowhere").await.unwrap_err();
        assert!(matches!(err, SkycastError::NotFound { .. }));
        assert_eq!(service.session().phase(), SessionPhase::Failed);
        assert!(service.session().error().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_weather_failure_fails_session() {
        let mut service = service(true);
        let err = service
            .focus_coordinate(Coordinate::new(14.6, 121.0))
            .await
            .unwrap_err();
        assert!(matches!(err, SkycastError::Provider { .. }));
        assert_eq!(service.session().phase(), SessionPhase::Failed);
        assert!(service.session().focus().is_none());
    }

    #[test]
    fn test_position_failure_reports_user_message() {
        let mut service = service(false);
        service.report_position_failure("permission denied");
        assert_eq!(service.session().phase(), SessionPhase::Failed);
        assert!(service.session().error().unwrap().contains("location"));
    }
}
