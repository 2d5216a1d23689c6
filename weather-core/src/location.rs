//! Device location.
//!
//! A terminal has no GPS, so [`ConfiguredLocation`] stands in for the device:
//! the user opts in and supplies coordinates in the config file. Reverse
//! lookups use Nominatim (OpenStreetMap), which needs no API key.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{
    config::LocationConfig,
    error::{Result, WeatherError},
    model::{Coordinates, ReverseAddress},
};

pub const NOMINATIM_REVERSE_URL: &str = "https://nominatim.openstreetmap.org/reverse";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

#[async_trait]
pub trait LocationService: Send + Sync + Debug {
    async fn request_permission(&self) -> PermissionStatus;

    /// One-shot position fix.
    async fn current_position(&self) -> Result<Coordinates>;

    /// `Ok(None)` when the lookup succeeded but named nothing.
    async fn reverse_lookup(&self, coords: Coordinates) -> Result<Option<ReverseAddress>>;
}

#[derive(Debug, Clone)]
pub struct ConfiguredLocation {
    config: LocationConfig,
    reverse: NominatimReverse,
}

impl ConfiguredLocation {
    pub fn new(config: LocationConfig, reverse: NominatimReverse) -> Self {
        Self { config, reverse }
    }
}

#[async_trait]
impl LocationService for ConfiguredLocation {
    async fn request_permission(&self) -> PermissionStatus {
        if self.config.enabled {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }

    async fn current_position(&self) -> Result<Coordinates> {
        if !self.config.enabled {
            return Err(WeatherError::PermissionDenied);
        }

        self.config.coordinates().ok_or_else(|| {
            WeatherError::Location(
                "No coordinates configured. Hint: run `weather configure`.".to_string(),
            )
        })
    }

    async fn reverse_lookup(&self, coords: Coordinates) -> Result<Option<ReverseAddress>> {
        self.reverse.lookup(coords).await
    }
}

#[derive(Debug, Clone)]
pub struct NominatimReverse {
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    state: Option<String>,
    county: Option<String>,
}

impl From<NominatimAddress> for ReverseAddress {
    fn from(addr: NominatimAddress) -> Self {
        // Prefer city > town > village > municipality for the locality.
        let city = addr.city.or(addr.town).or(addr.village).or(addr.municipality);
        let region = addr.state.or(addr.county);
        ReverseAddress { city, region }
    }
}

impl NominatimReverse {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    pub async fn lookup(&self, coords: Coordinates) -> Result<Option<ReverseAddress>> {
        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
                ("format", "json".to_string()),
                ("addressdetails", "1".to_string()),
                ("zoom", "10".to_string()),
            ])
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::debug!("Reverse geocode returned status {}", res.status());
            return Ok(None);
        }

        let body: NominatimResponse = serde_json::from_str(&res.text().await?)?;
        Ok(body.address.map(ReverseAddress::from))
    }
}
