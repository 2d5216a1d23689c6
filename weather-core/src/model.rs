use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label shown when the device position cannot be named.
pub const MY_LOCATION_LABEL: &str = "My Location";

/// A point on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// What the user asked to see weather for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationQuery {
    CurrentDevice,
    TextSearch(String),
}

/// A geocoded place, ready to be handed to the forecast provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceResult {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

impl PlaceResult {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Result of a reverse lookup. Either part may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReverseAddress {
    pub city: Option<String>,
    pub region: Option<String>,
}

/// Current readings in provider-native units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    #[serde(rename = "temperature_2m")]
    pub temperature_c: f64,
    #[serde(rename = "relative_humidity_2m")]
    pub humidity_pct: f64,
    #[serde(rename = "apparent_temperature")]
    pub apparent_temperature_c: f64,
    #[serde(rename = "precipitation")]
    pub precipitation_mm: f64,
    pub weather_code: i32,
    #[serde(rename = "surface_pressure")]
    pub surface_pressure_hpa: f64,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed_kmh: f64,
    pub uv_index: f64,
    #[serde(rename = "visibility")]
    pub visibility_m: f64,
    #[serde(rename = "dew_point_2m")]
    pub dew_point_c: f64,
}

/// One successful fetch. Replaced wholesale, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub conditions: CurrentConditions,
    pub location_label: String,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    pub fn new(conditions: CurrentConditions, location_label: impl Into<String>) -> Self {
        Self {
            conditions,
            location_label: location_label.into(),
            fetched_at: Utc::now(),
        }
    }
}
