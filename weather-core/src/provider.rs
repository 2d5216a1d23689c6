use crate::{
    Config, CurrentConditions,
    error::Result,
    geocode::{Geocoder, OpenMeteoGeocoder},
    location::{ConfiguredLocation, LocationService, NominatimReverse},
    provider::openmeteo::OpenMeteoProvider,
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, sync::Arc};

pub mod openmeteo;

const USER_AGENT: &str = concat!("weather-cli/", env!("CARGO_PKG_VERSION"));

/// Source of current conditions for a coordinate pair.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_weather(&self, latitude: f64, longitude: f64) -> Result<CurrentConditions>;
}

/// The external collaborators a session talks to.
#[derive(Debug, Clone)]
pub struct Services {
    pub weather: Arc<dyn WeatherProvider>,
    pub geocoder: Arc<dyn Geocoder>,
    pub location: Arc<dyn LocationService>,
}

/// Construct the provider set described by the configuration.
pub fn services_from_config(config: &Config) -> anyhow::Result<Services> {
    let http = Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")?;

    let reverse = NominatimReverse::new(http.clone(), config.reverse_geocoding_url.clone());

    Ok(Services {
        weather: Arc::new(OpenMeteoProvider::new(http.clone(), config.forecast_url.clone())),
        geocoder: Arc::new(OpenMeteoGeocoder::new(http, config.geocoding_url.clone())),
        location: Arc::new(ConfiguredLocation::new(config.location.clone(), reverse)),
    })
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
