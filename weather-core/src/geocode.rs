//! Place name resolution.
//!
//! Forward lookups go to the Open-Meteo geocoding API. Reverse lookups are
//! delegated to the [`LocationService`] and never fail: the label degrades
//! from city to region to [`MY_LOCATION_LABEL`].

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{
    error::{Result, WeatherError},
    location::LocationService,
    model::{Coordinates, MY_LOCATION_LABEL, PlaceResult, ReverseAddress},
    provider::truncate_body,
};

pub const OPEN_METEO_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

/// Maps free text to the best matching place.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn forward_geocode(&self, query: &str) -> Result<PlaceResult>;
}

#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    base_url: String,
    http: Client,
}

impl OpenMeteoGeocoder {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeoSearchResponse {
    #[serde(default)]
    results: Option<Vec<GeoResult>>,
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    latitude: f64,
    longitude: f64,
    name: String,
    #[serde(default)]
    country: Option<String>,
}

impl GeoResult {
    fn into_place(self) -> PlaceResult {
        let display_name = match self.country.as_deref().filter(|c| !c.is_empty()) {
            Some(country) => format!("{}, {}", self.name, country),
            None => self.name,
        };

        PlaceResult {
            latitude: self.latitude,
            longitude: self.longitude,
            display_name,
        }
    }
}

#[async_trait]
impl Geocoder for OpenMeteoGeocoder {
    async fn forward_geocode(&self, query: &str) -> Result<PlaceResult> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WeatherError::NotFound);
        }

        tracing::debug!(query, "forward geocoding");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[("name", query), ("count", "1")])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::Provider(format!(
                "Geocoding request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: GeoSearchResponse = serde_json::from_str(&body)?;

        parsed
            .results
            .and_then(|results| results.into_iter().next())
            .map(GeoResult::into_place)
            .ok_or(WeatherError::NotFound)
    }
}

/// Pick the display label for a reverse lookup result.
pub fn reverse_label(address: Option<&ReverseAddress>) -> String {
    address
        .and_then(|a| non_blank(&a.city).or_else(|| non_blank(&a.region)))
        .unwrap_or_else(|| MY_LOCATION_LABEL.to_string())
}

fn non_blank(part: &Option<String>) -> Option<String> {
    part.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Name the given coordinates. Lookup failures fall back to [`MY_LOCATION_LABEL`].
pub async fn reverse_geocode(service: &dyn LocationService, coords: Coordinates) -> PlaceResult {
    let address = match service.reverse_lookup(coords).await {
        Ok(address) => address,
        Err(e) => {
            tracing::warn!("Reverse lookup failed: {}", e);
            None
        }
    };

    let display_name = reverse_label(address.as_ref());
    tracing::info!("Reverse geocoded to: {}", display_name);

    PlaceResult {
        latitude: coords.latitude,
        longitude: coords.longitude,
        display_name,
    }
}
