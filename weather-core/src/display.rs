//! Text for the weather grid, header and recent-search chips.

use chrono::{DateTime, TimeZone};

use crate::{condition, model::CurrentConditions};

pub const FOOTER: &str = "Powered by Open-Meteo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherField {
    pub label: &'static str,
    pub value: String,
}

impl WeatherField {
    fn new(label: &'static str, value: String) -> Self {
        Self { label, value }
    }
}

/// The eight grid cells, in display order.
///
/// Values are shown in provider units, except visibility (m → km) and
/// pressure (rounded to a whole hPa).
pub fn weather_fields(c: &CurrentConditions) -> Vec<WeatherField> {
    vec![
        WeatherField::new("Temperature", format!("{}°C", c.temperature_c)),
        WeatherField::new("Condition", condition::describe(c.weather_code).to_string()),
        WeatherField::new("Wind", format!("{} km/h", c.wind_speed_kmh)),
        WeatherField::new("UV Index", c.uv_index.to_string()),
        WeatherField::new("Humidity", format!("{}%", c.humidity_pct)),
        WeatherField::new("Dew Point", format!("{}°C", c.dew_point_c)),
        WeatherField::new("Pressure", format!("{:.0} hPa", c.surface_pressure_hpa.round())),
        WeatherField::new("Visibility", format!("{} km", c.visibility_m / 1000.0)),
    ]
}

/// Header clock, e.g. `09:05 PM`.
pub fn clock_text<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%I:%M %p").to_string()
}

/// Date line, e.g. `Sunday, October 18`.
pub fn date_text<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%A, %B %-d").to_string()
}

/// Short chip text for a history entry: the part before the first comma.
pub fn chip_text(entry: &str) -> &str {
    entry.split(',').next().unwrap_or(entry)
}
