/// Message surfaced when the forecast provider answers with a non-success status.
pub const WEATHER_UNAVAILABLE: &str = "Weather data unavailable";

/// Failures produced by providers and the location service.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location not found")]
    NotFound,
    #[error("{0}")]
    Provider(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Malformed provider response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Location error: {0}")]
    Location(String),
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
