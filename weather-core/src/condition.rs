//! WMO weather code descriptions.
//! See: https://open-meteo.com/en/docs#weathervariables

pub const UNKNOWN_CONDITION: &str = "Unknown";

const CONDITIONS: &[(i32, &str)] = &[
    (0, "Clear sky"),
    (1, "Mainly clear"),
    (2, "Partly cloudy"),
    (3, "Overcast"),
    (45, "Foggy"),
    (48, "Depositing rime fog"),
    (51, "Light drizzle"),
    (53, "Moderate drizzle"),
    (55, "Dense drizzle"),
    (61, "Slight rain"),
    (63, "Moderate rain"),
    (65, "Heavy rain"),
    (95, "Thunderstorm"),
];

/// Human-readable condition for a weather code; codes outside the table map to "Unknown".
pub fn describe(code: i32) -> &'static str {
    CONDITIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, text)| *text)
        .unwrap_or(UNKNOWN_CONDITION)
}
