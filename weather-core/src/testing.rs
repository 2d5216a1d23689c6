//! In-memory collaborators for flow tests.

use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use crate::{
    error::{Result, WEATHER_UNAVAILABLE, WeatherError},
    geocode::Geocoder,
    location::{LocationService, PermissionStatus},
    model::{Coordinates, CurrentConditions, PlaceResult, ReverseAddress},
    provider::{Services, WeatherProvider},
};

pub fn conditions() -> CurrentConditions {
    CurrentConditions {
        temperature_c: 14.2,
        humidity_pct: 71.0,
        apparent_temperature_c: 12.9,
        precipitation_mm: 0.0,
        weather_code: 3,
        surface_pressure_hpa: 1008.6,
        wind_speed_kmh: 11.5,
        uv_index: 2.35,
        visibility_m: 24140.0,
        dew_point_c: 9.1,
    }
}

#[derive(Debug, Default)]
pub struct FakeWeather {
    pub fail: bool,
    pub calls: Mutex<Vec<(f64, f64)>>,
}

impl FakeWeather {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(f64, f64)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherProvider for FakeWeather {
    async fn fetch_weather(&self, latitude: f64, longitude: f64) -> Result<CurrentConditions> {
        self.calls.lock().unwrap().push((latitude, longitude));
        if self.fail {
            return Err(WeatherError::Provider(WEATHER_UNAVAILABLE.to_string()));
        }
        Ok(conditions())
    }
}

#[derive(Debug, Default)]
pub struct FakeGeocoder {
    pub places: HashMap<String, (PlaceResult, Duration)>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn with_place(mut self, query: &str, lat: f64, lon: f64, label: &str) -> Self {
        self.places.insert(query.to_string(), (place(lat, lon, label), Duration::ZERO));
        self
    }

    pub fn with_slow_place(mut self, query: &str, label: &str, delay: Duration) -> Self {
        self.places.insert(query.to_string(), (place(1.0, 1.0, label), delay));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

fn place(latitude: f64, longitude: f64, label: &str) -> PlaceResult {
    PlaceResult {
        latitude,
        longitude,
        display_name: label.to_string(),
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn forward_geocode(&self, query: &str) -> Result<PlaceResult> {
        self.calls.lock().unwrap().push(query.to_string());
        let (place, delay) = self.places.get(query).cloned().ok_or(WeatherError::NotFound)?;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(place)
    }
}

#[derive(Debug)]
pub struct FakeLocation {
    pub permission: PermissionStatus,
    pub position: Option<Coordinates>,
    pub address: Option<ReverseAddress>,
}

impl FakeLocation {
    pub fn granted(city: Option<&str>, region: Option<&str>) -> Self {
        Self {
            permission: PermissionStatus::Granted,
            position: Some(Coordinates::new(59.33, 18.07)),
            address: Some(ReverseAddress {
                city: city.map(str::to_owned),
                region: region.map(str::to_owned),
            }),
        }
    }

    pub fn denied() -> Self {
        Self {
            permission: PermissionStatus::Denied,
            position: None,
            address: None,
        }
    }
}

#[async_trait]
impl LocationService for FakeLocation {
    async fn request_permission(&self) -> PermissionStatus {
        self.permission
    }

    async fn current_position(&self) -> Result<Coordinates> {
        self.position
            .ok_or_else(|| WeatherError::Location("no fix".to_string()))
    }

    async fn reverse_lookup(&self, _coords: Coordinates) -> Result<Option<ReverseAddress>> {
        Ok(self.address.clone())
    }
}

pub struct Fakes {
    pub weather: Arc<FakeWeather>,
    pub geocoder: Arc<FakeGeocoder>,
    pub location: Arc<FakeLocation>,
}

impl Fakes {
    pub fn new(weather: FakeWeather, geocoder: FakeGeocoder, location: FakeLocation) -> Self {
        Self {
            weather: Arc::new(weather),
            geocoder: Arc::new(geocoder),
            location: Arc::new(location),
        }
    }

    pub fn services(&self) -> Services {
        Services {
            weather: self.weather.clone(),
            geocoder: self.geocoder.clone(),
            location: self.location.clone(),
        }
    }
}
