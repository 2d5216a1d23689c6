//! Application state and the updates that mutate it.

use chrono::{DateTime, Local};

use crate::{
    history::RecentSearches,
    model::{MY_LOCATION_LABEL, WeatherSnapshot},
};

/// Where the most recent flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowPhase {
    #[default]
    Idle,
    RequestingPermission,
    AwaitingFix,
    ReverseGeocoding,
    Geocoding,
    FetchingWeather,
    Ready,
    Denied,
    Failed,
}

impl FlowPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Idle | Self::Ready | Self::Denied | Self::Failed)
    }
}

/// A single change emitted by a flow or the clock.
#[derive(Debug, Clone, PartialEq)]
pub enum StateUpdate {
    Phase(FlowPhase),
    Loading(bool),
    WeatherReady(WeatherSnapshot),
    Alert(String),
    RememberSearch(String),
    ClearSearchText,
    Tick(DateTime<Local>),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub snapshot: Option<WeatherSnapshot>,
    pub location_label: String,
    pub loading: bool,
    pub search_text: String,
    pub recent: RecentSearches,
    pub clock: DateTime<Local>,
    pub phase: FlowPhase,
    /// Pending user-facing message, cleared once shown.
    pub alert: Option<String>,
}

impl AppState {
    pub fn new(recent: RecentSearches) -> Self {
        Self {
            snapshot: None,
            location_label: MY_LOCATION_LABEL.to_string(),
            loading: false,
            search_text: String::new(),
            recent,
            clock: Local::now(),
            phase: FlowPhase::Idle,
            alert: None,
        }
    }

    /// Apply one update. Returns `true` if the recent-search list changed.
    pub fn apply(&mut self, update: StateUpdate) -> bool {
        match update {
            StateUpdate::Phase(phase) => self.phase = phase,
            StateUpdate::Loading(loading) => self.loading = loading,
            StateUpdate::WeatherReady(snapshot) => {
                self.location_label = snapshot.location_label.clone();
                self.snapshot = Some(snapshot);
            }
            StateUpdate::Alert(message) => self.alert = Some(message),
            StateUpdate::RememberSearch(label) => return self.recent.record(&label),
            StateUpdate::ClearSearchText => self.search_text.clear(),
            StateUpdate::Tick(now) => self.clock = now,
        }
        false
    }
}
