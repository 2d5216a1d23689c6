//! The two resolver flows.
//!
//! A flow never touches [`AppState`](crate::state::AppState) directly. It
//! reports each step as a [`StateUpdate`] on the shared channel, and the
//! owner applies them in arrival order. Overlapping flows are therefore
//! last-response-wins.

use tokio::sync::mpsc::UnboundedSender;

use crate::{
    error::WeatherError,
    geocode::reverse_geocode,
    location::PermissionStatus,
    model::{LocationQuery, PlaceResult, WeatherSnapshot},
    provider::Services,
    state::{FlowPhase, StateUpdate},
};

pub const CITY_NOT_FOUND: &str = "City not found";
pub const LOCATION_UNAVAILABLE: &str = "Current location unavailable";

#[derive(Debug, Clone)]
pub struct Resolver {
    services: Services,
    tx: UnboundedSender<StateUpdate>,
}

impl Resolver {
    pub fn new(services: Services, tx: UnboundedSender<StateUpdate>) -> Self {
        Self { services, tx }
    }

    pub async fn run(&self, query: &LocationQuery) -> FlowPhase {
        match query {
            LocationQuery::CurrentDevice => self.resolve_current_location().await,
            LocationQuery::TextSearch(raw) => self.search(raw).await,
        }
    }

    /// Permission, position fix, reverse geocode, then weather.
    ///
    /// Never records the resolved label as a recent search.
    pub async fn resolve_current_location(&self) -> FlowPhase {
        self.send(StateUpdate::Loading(true));
        self.send(StateUpdate::Phase(FlowPhase::RequestingPermission));

        let location = &self.services.location;
        if location.request_permission().await == PermissionStatus::Denied {
            tracing::info!("location permission denied");
            return self.finish(FlowPhase::Denied);
        }

        self.send(StateUpdate::Phase(FlowPhase::AwaitingFix));
        let coords = match location.current_position().await {
            Ok(coords) => coords,
            Err(WeatherError::PermissionDenied) => return self.finish(FlowPhase::Denied),
            Err(e) => {
                tracing::warn!("position fix failed: {}", e);
                return self.fail(LOCATION_UNAVAILABLE.to_string());
            }
        };

        self.send(StateUpdate::Phase(FlowPhase::ReverseGeocoding));
        let place = reverse_geocode(location.as_ref(), coords).await;

        match self.fetch(&place).await {
            Ok(_) => self.finish(FlowPhase::Ready),
            Err(e) => self.fail(e.to_string()),
        }
    }

    /// Forward geocode `query`, then weather. Blank queries do nothing.
    pub async fn search(&self, query: &str) -> FlowPhase {
        let query = query.trim();
        if query.is_empty() {
            return FlowPhase::Idle;
        }

        self.send(StateUpdate::Loading(true));
        self.send(StateUpdate::Phase(FlowPhase::Geocoding));

        let place = match self.services.geocoder.forward_geocode(query).await {
            Ok(place) => place,
            Err(e) => {
                tracing::debug!(query, "geocoding failed: {}", e);
                return self.fail(CITY_NOT_FOUND.to_string());
            }
        };

        match self.fetch(&place).await {
            Ok(snapshot) => {
                self.send(StateUpdate::RememberSearch(snapshot.location_label));
                self.send(StateUpdate::ClearSearchText);
                self.finish(FlowPhase::Ready)
            }
            Err(e) => self.fail(e.to_string()),
        }
    }

    async fn fetch(&self, place: &PlaceResult) -> Result<WeatherSnapshot, WeatherError> {
        self.send(StateUpdate::Phase(FlowPhase::FetchingWeather));

        let conditions = self
            .services
            .weather
            .fetch_weather(place.latitude, place.longitude)
            .await?;

        let snapshot = WeatherSnapshot::new(conditions, place.display_name.clone());
        self.send(StateUpdate::WeatherReady(snapshot.clone()));
        Ok(snapshot)
    }

    fn fail(&self, message: String) -> FlowPhase {
        self.send(StateUpdate::Alert(message));
        self.finish(FlowPhase::Failed)
    }

    fn finish(&self, phase: FlowPhase) -> FlowPhase {
        self.send(StateUpdate::Phase(phase));
        self.send(StateUpdate::Loading(false));
        phase
    }

    fn send(&self, update: StateUpdate) {
        if self.tx.send(update).is_err() {
            tracing::debug!("state receiver dropped; update discarded");
        }
    }
}
