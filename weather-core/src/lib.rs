//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration and durable key-value storage
//! - Forecast, geocoding and device-location abstractions
//! - The location and search flows, and the state they drive
//! - Shared domain models and display helpers
//!
//! It is used by `weather-cli`, but can also be reused by other frontends.

pub mod app;
pub mod clock;
pub mod condition;
pub mod config;
pub mod display;
pub mod error;
pub mod flow;
pub mod geocode;
pub mod history;
pub mod location;
pub mod model;
pub mod provider;
pub mod state;
pub mod storage;

#[cfg(test)]
mod testing;

pub use app::App;
pub use config::{Config, LocationConfig};
pub use error::WeatherError;
pub use geocode::Geocoder;
pub use history::RecentSearches;
pub use location::{LocationService, PermissionStatus};
pub use model::{
    Coordinates, CurrentConditions, LocationQuery, MY_LOCATION_LABEL, PlaceResult,
    ReverseAddress, WeatherSnapshot,
};
pub use provider::{Services, WeatherProvider, services_from_config};
pub use state::{AppState, FlowPhase, StateUpdate};
