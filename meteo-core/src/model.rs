use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub country_code: Option<String>,
    pub timezone: Option<String>,
}

/// Current conditions for one location.
///
/// Deserialized straight from the Open-Meteo `current` block (the `alias`
/// attributes carry the upstream field names); serialized with the stable
/// names below. `description` is never supplied upstream, it is derived from
/// `weather_code` after parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    #[serde(alias = "temperature_2m")]
    pub temperature_c: f64,
    #[serde(default, alias = "relative_humidity_2m")]
    pub relative_humidity: Option<f64>,
    #[serde(default, alias = "apparent_temperature")]
    pub apparent_temperature_c: Option<f64>,
    #[serde(default)]
    pub weather_code: Option<i64>,
    #[serde(default, alias = "wind_speed_10m")]
    pub wind_speed_kmh: Option<f64>,
    #[serde(default, alias = "precipitation")]
    pub precipitation_mm: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentReport {
    pub city: String,
    pub coordinates: Coordinates,
    pub current: CurrentWeather,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyForecastItem {
    /// ISO 8601 calendar date.
    pub date: String,
    pub temp_min_c: Option<f64>,
    pub temp_max_c: Option<f64>,
    pub precipitation_sum_mm: Option<f64>,
    pub wind_speed_max_kmh: Option<f64>,
    pub weather_code: Option<i64>,
    pub description: Option<String>,
}

/// Result of the `get_forecast` tool. `days` always equals `daily.len()`;
/// `daily` is ordered by ascending date with one entry per returned day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    pub city: String,
    pub coordinates: Coordinates,
    pub days: usize,
    pub daily: Vec<DailyForecastItem>,
}

/// French description for a WMO weather code, with a generic fallback for
/// codes outside the published table.
pub fn describe_weather_code(code: i64) -> String {
    let known = match code {
        0 => "Ciel dégagé",
        1 => "Principalement clair",
        2 => "Partiellement nuageux",
        3 => "Couvert",
        45 => "Brouillard",
        48 => "Brouillard givrant",
        51 => "Bruine légère",
        53 => "Bruine modérée",
        55 => "Bruine dense",
        56 => "Bruine verglaçante légère",
        57 => "Bruine verglaçante dense",
        61 => "Pluie faible",
        63 => "Pluie modérée",
        65 => "Pluie forte",
        66 => "Pluie verglaçante légère",
        67 => "Pluie verglaçante forte",
        71 => "Chute de neige faible",
        73 => "Chute de neige modérée",
        75 => "Chute de neige forte",
        77 => "Grains de neige",
        80 => "Averses faibles",
        81 => "Averses modérées",
        82 => "Averses fortes",
        85 => "Averses de neige faibles",
        86 => "Averses de neige fortes",
        95 => "Orage",
        96 => "Orage avec grésil léger",
        99 => "Orage avec grésil fort",
        _ => return format!("Code météo {code}"),
    };
    known.to_string()
}
