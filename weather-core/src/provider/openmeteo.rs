use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{Result, WEATHER_UNAVAILABLE, WeatherError},
    model::CurrentConditions,
    provider::truncate_body,
};

use super::WeatherProvider;

pub const OPEN_METEO_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Every field requested in the `current` block, in one call.
pub const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,\
precipitation,weather_code,surface_pressure,wind_speed_10m,uv_index,visibility,dew_point_2m";

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    current: CurrentConditions,
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn fetch_weather(&self, latitude: f64, longitude: f64) -> Result<CurrentConditions> {
        tracing::debug!(latitude, longitude, "fetching current conditions");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::warn!(%status, body = %truncate_body(&body), "forecast request failed");
            return Err(WeatherError::Provider(WEATHER_UNAVAILABLE.to_string()));
        }

        let parsed: OmForecastResponse = serde_json::from_str(&body)?;
        Ok(parsed.current)
    }
}
