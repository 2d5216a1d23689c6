//! The session controller: sole owner of [`AppState`].

use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
    clock::{CLOCK_PERIOD, ClockHandle, spawn_clock},
    flow::Resolver,
    history::RecentSearches,
    model::LocationQuery,
    provider::Services,
    state::{AppState, FlowPhase, StateUpdate},
    storage::KeyValueStore,
};

#[derive(Debug)]
pub struct App {
    state: AppState,
    store: Arc<dyn KeyValueStore>,
    resolver: Resolver,
    tx: UnboundedSender<StateUpdate>,
    updates: UnboundedReceiver<StateUpdate>,
}

impl App {
    /// Recent searches are read from `store` here, once.
    pub fn new(services: Services, store: Arc<dyn KeyValueStore>) -> Self {
        let (tx, updates) = mpsc::unbounded_channel();
        let recent = RecentSearches::load(store.as_ref());

        Self {
            state: AppState::new(recent),
            store,
            resolver: Resolver::new(services, tx.clone()),
            tx,
            updates,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// A handle for running flows outside `&mut self`, e.g. concurrently.
    pub fn resolver(&self) -> Resolver {
        self.resolver.clone()
    }

    /// Start the minute clock. Keep the handle for as long as the view lives.
    pub fn start_clock(&self) -> ClockHandle {
        spawn_clock(self.tx.clone(), CLOCK_PERIOD)
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.state.search_text = text.into();
    }

    /// Resolve the device location; used at startup and on refresh.
    pub async fn refresh(&mut self) -> FlowPhase {
        let phase = self.resolver.resolve_current_location().await;
        self.sync();
        phase
    }

    /// Search `query`, or the current search text when `None`.
    ///
    /// Recent-search entries are passed back in here as plain queries.
    pub async fn submit_search(&mut self, query: Option<&str>) -> FlowPhase {
        let query = match query {
            Some(q) => q.to_string(),
            None => self.state.search_text.clone(),
        };

        let phase = self.resolver.search(&query).await;
        self.sync();
        phase
    }

    pub async fn run(&mut self, query: &LocationQuery) -> FlowPhase {
        let phase = self.resolver.run(query).await;
        self.sync();
        phase
    }

    /// Apply every pending update. Returns how many were applied.
    pub fn sync(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.updates.try_recv() {
            if self.state.apply(update) {
                self.persist_recent();
            }
            applied += 1;
        }
        applied
    }

    pub fn take_alert(&mut self) -> Option<String> {
        self.state.alert.take()
    }

    fn persist_recent(&self) {
        if let Err(e) = self.state.recent.save(self.store.as_ref()) {
            tracing::warn!("Failed to save history: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        history::RECENT_SEARCHES_KEY,
        storage::MemoryStore,
        testing::{FakeGeocoder, FakeLocation, FakeWeather, Fakes},
    };
    use std::time::Duration;

    fn paris_geocoder() -> FakeGeocoder {
        FakeGeocoder::default()
            .with_place("Paris", 48.85, 2.35, "Paris, France")
            .with_place("Oslo", 59.91, 10.75, "Oslo, Norway")
    }

    fn app_with(fakes: &Fakes) -> (App, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        (App::new(fakes.services(), store.clone()), store)
    }

    #[tokio::test]
    async fn paris_search_fetches_at_coordinates_and_records() {
        let fakes = Fakes::new(
            FakeWeather::default(),
            paris_geocoder(),
            FakeLocation::denied(),
        );
        let (mut app, store) = app_with(&fakes);
        app.set_search_text("Paris");

        let phase = app.submit_search(None).await;

        assert_eq!(phase, FlowPhase::Ready);
        assert_eq!(fakes.weather.calls(), vec![(48.85, 2.35)]);

        let state = app.state();
        assert_eq!(state.phase, FlowPhase::Ready);
        assert_eq!(state.location_label, "Paris, France");
        assert_eq!(state.snapshot.as_ref().unwrap().location_label, "Paris, France");
        assert!(!state.loading);
        assert!(state.search_text.is_empty());
        assert_eq!(state.recent.entries(), ["Paris, France"]);
        assert_eq!(
            store.get_item(RECENT_SEARCHES_KEY).unwrap().as_deref(),
            Some(r#"["Paris, France"]"#)
        );
    }

    #[tokio::test]
    async fn forecast_failure_surfaces_message_without_recording() {
        let fakes = Fakes::new(FakeWeather::failing(), paris_geocoder(), FakeLocation::denied());
        let (mut app, store) = app_with(&fakes);

        let phase = app.submit_search(Some("Paris")).await;

        assert_eq!(phase, FlowPhase::Failed);
        assert_eq!(app.state().phase, FlowPhase::Failed);
        assert!(!app.state().loading);
        assert!(app.state().recent.is_empty());
        assert!(app.state().snapshot.is_none());
        assert_eq!(store.get_item(RECENT_SEARCHES_KEY).unwrap(), None);
        assert_eq!(app.take_alert().as_deref(), Some("Weather data unavailable"));
        assert_eq!(app.take_alert(), None);
    }

    #[tokio::test]
    async fn unknown_city_reports_city_not_found() {
        let fakes = Fakes::new(FakeWeather::default(), paris_geocoder(), FakeLocation::denied());
        let (mut app, _store) = app_with(&fakes);
        app.set_search_text("Atlantis");

        let phase = app.submit_search(None).await;

        assert_eq!(phase, FlowPhase::Failed);
        assert!(!app.state().loading);
        assert!(fakes.weather.calls().is_empty());
        assert_eq!(app.state().search_text, "Atlantis");
        assert_eq!(app.take_alert().as_deref(), Some("City not found"));
    }

    #[tokio::test]
    async fn blank_query_is_a_no_op() {
        let fakes = Fakes::new(FakeWeather::default(), paris_geocoder(), FakeLocation::denied());
        let (mut app, _store) = app_with(&fakes);
        app.set_search_text("   \t");

        let phase = app.submit_search(None).await;

        assert_eq!(phase, FlowPhase::Idle);
        assert_eq!(app.state().phase, FlowPhase::Idle);
        assert!(!app.state().loading);
        assert!(fakes.geocoder.calls().is_empty());
        assert!(fakes.weather.calls().is_empty());
        assert_eq!(app.sync(), 0);
    }

    #[tokio::test]
    async fn query_is_trimmed_before_geocoding() {
        let fakes = Fakes::new(FakeWeather::default(), paris_geocoder(), FakeLocation::denied());
        let (mut app, _store) = app_with(&fakes);

        app.submit_search(Some("  Paris ")).await;
        assert_eq!(fakes.geocoder.calls(), vec!["Paris".to_string()]);
    }

    #[tokio::test]
    async fn repeated_search_moves_entry_to_front() {
        let geocoder = paris_geocoder().with_place("Paris, France", 48.85, 2.35, "Paris, France");
        let fakes = Fakes::new(FakeWeather::default(), geocoder, FakeLocation::denied());
        let (mut app, _store) = app_with(&fakes);

        app.submit_search(Some("Paris")).await;
        app.submit_search(Some("Oslo")).await;
        assert_eq!(app.state().recent.entries(), ["Oslo, Norway", "Paris, France"]);

        // History entries are replayed through the geocoder, not served from a cache.
        let entry = app.state().recent.get(1).unwrap().to_string();
        let phase = app.submit_search(Some(&entry)).await;

        assert_eq!(phase, FlowPhase::Ready);
        assert_eq!(fakes.geocoder.calls().last().map(String::as_str), Some("Paris, France"));
        assert_eq!(fakes.weather.calls().len(), 3);
        assert_eq!(app.state().recent.entries(), ["Paris, France", "Oslo, Norway"]);
    }

    #[tokio::test]
    async fn permission_denied_is_silent() {
        let fakes = Fakes::new(FakeWeather::default(), paris_geocoder(), FakeLocation::denied());
        let (mut app, _store) = app_with(&fakes);

        let phase = app.refresh().await;

        assert_eq!(phase, FlowPhase::Denied);
        assert_eq!(app.state().phase, FlowPhase::Denied);
        assert!(!app.state().loading);
        assert_eq!(app.take_alert(), None);
        assert!(fakes.weather.calls().is_empty());
    }

    #[tokio::test]
    async fn device_location_uses_city_and_is_not_recorded() {
        let fakes = Fakes::new(
            FakeWeather::default(),
            paris_geocoder(),
            FakeLocation::granted(Some("Stockholm"), Some("Stockholm County")),
        );
        let (mut app, store) = app_with(&fakes);

        let phase = app.run(&LocationQuery::CurrentDevice).await;

        assert_eq!(phase, FlowPhase::Ready);
        assert_eq!(app.state().location_label, "Stockholm");
        assert_eq!(fakes.weather.calls(), vec![(59.33, 18.07)]);
        assert!(app.state().recent.is_empty());
        assert_eq!(store.get_item(RECENT_SEARCHES_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn device_location_falls_back_to_region_then_my_location() {
        let fakes = Fakes::new(
            FakeWeather::default(),
            paris_geocoder(),
            FakeLocation::granted(None, Some("Lapland")),
        );
        let (mut app, _store) = app_with(&fakes);
        app.refresh().await;
        assert_eq!(app.state().location_label, "Lapland");
        assert!(app.state().recent.is_empty());

        let fakes = Fakes::new(
            FakeWeather::default(),
            paris_geocoder(),
            FakeLocation::granted(None, None),
        );
        let (mut app, _store) = app_with(&fakes);
        app.refresh().await;
        assert_eq!(app.state().location_label, "My Location");
        assert!(app.state().recent.is_empty());
    }

    #[tokio::test]
    async fn device_weather_failure_alerts() {
        let fakes = Fakes::new(
            FakeWeather::failing(),
            paris_geocoder(),
            FakeLocation::granted(Some("Stockholm"), None),
        );
        let (mut app, _store) = app_with(&fakes);

        assert_eq!(app.refresh().await, FlowPhase::Failed);
        assert!(!app.state().loading);
        assert_eq!(app.take_alert().as_deref(), Some("Weather data unavailable"));
    }

    #[tokio::test]
    async fn missing_fix_fails_with_location_message() {
        let mut location = FakeLocation::granted(Some("Stockholm"), None);
        location.position = None;
        let fakes = Fakes::new(FakeWeather::default(), paris_geocoder(), location);
        let (mut app, _store) = app_with(&fakes);

        assert_eq!(app.refresh().await, FlowPhase::Failed);
        assert_eq!(app.take_alert().as_deref(), Some("Current location unavailable"));
        assert!(fakes.weather.calls().is_empty());
    }

    #[tokio::test]
    async fn history_is_loaded_once_at_startup() {
        let fakes = Fakes::new(FakeWeather::default(), paris_geocoder(), FakeLocation::denied());
        let store = Arc::new(MemoryStore::default());
        store
            .set_item(RECENT_SEARCHES_KEY, r#"["Rome, Italy","Oslo, Norway"]"#)
            .unwrap();

        let mut app = App::new(fakes.services(), store.clone());
        assert_eq!(app.state().recent.entries(), ["Rome, Italy", "Oslo, Norway"]);

        app.submit_search(Some("Paris")).await;
        assert_eq!(
            store.get_item(RECENT_SEARCHES_KEY).unwrap().as_deref(),
            Some(r#"["Paris, France","Rome, Italy","Oslo, Norway"]"#)
        );
    }

    #[tokio::test]
    async fn phases_follow_search_order() {
        let fakes = Fakes::new(FakeWeather::default(), paris_geocoder(), FakeLocation::denied());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let resolver = Resolver::new(fakes.services(), tx);

        resolver.search("Paris").await;

        let mut phases = Vec::new();
        while let Ok(update) = rx.try_recv() {
            if let StateUpdate::Phase(p) = update {
                phases.push(p);
            }
        }
        assert_eq!(
            phases,
            [FlowPhase::Geocoding, FlowPhase::FetchingWeather, FlowPhase::Ready]
        );
    }

    #[tokio::test]
    async fn phases_follow_location_order() {
        let fakes = Fakes::new(
            FakeWeather::default(),
            paris_geocoder(),
            FakeLocation::granted(Some("Stockholm"), None),
        );
        let (tx, mut rx) = mpsc::unbounded_channel();
        let resolver = Resolver::new(fakes.services(), tx);

        resolver.resolve_current_location().await;

        let mut phases = Vec::new();
        while let Ok(update) = rx.try_recv() {
            if let StateUpdate::Phase(p) = update {
                phases.push(p);
            }
        }
        assert_eq!(
            phases,
            [
                FlowPhase::RequestingPermission,
                FlowPhase::AwaitingFix,
                FlowPhase::ReverseGeocoding,
                FlowPhase::FetchingWeather,
                FlowPhase::Ready,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_searches_last_response_wins() {
        let geocoder = FakeGeocoder::default()
            .with_slow_place("Slow", "Slowtown, Nowhere", Duration::from_millis(500))
            .with_slow_place("Fast", "Fastville, Nowhere", Duration::from_millis(10));
        let fakes = Fakes::new(FakeWeather::default(), geocoder, FakeLocation::denied());
        let (mut app, _store) = app_with(&fakes);

        let first = app.resolver();
        let second = app.resolver();
        let (a, b) = tokio::join!(first.search("Slow"), second.search("Fast"));
        assert_eq!((a, b), (FlowPhase::Ready, FlowPhase::Ready));

        app.sync();
        let state = app.state();
        assert_eq!(state.location_label, "Slowtown, Nowhere");
        assert_eq!(state.recent.entries(), ["Slowtown, Nowhere", "Fastville, Nowhere"]);
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn clock_updates_state_through_channel() {
        let fakes = Fakes::new(FakeWeather::default(), paris_geocoder(), FakeLocation::denied());
        let (mut app, _store) = app_with(&fakes);
        let before = app.state().clock;

        let clock = app.start_clock();
        tokio::time::sleep(CLOCK_PERIOD + Duration::from_secs(1)).await;

        assert_eq!(app.sync(), 1);
        assert!(app.state().clock >= before);
        clock.stop();
    }
}
