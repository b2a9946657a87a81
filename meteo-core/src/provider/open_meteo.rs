use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::{Error, Result},
    model::{
        Coordinates, CurrentReport, CurrentWeather, DailyForecastItem, ForecastResult,
        describe_weather_code,
    },
};

use super::WeatherProvider;

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Per-call timeout; exceeding it surfaces as an upstream error.
const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m,precipitation";
const DAILY_FIELDS: &str =
    "weather_code,temperature_2m_max,temperature_2m_min,precipitation_sum,wind_speed_10m_max";

/// Weather provider backed by the public Open-Meteo APIs.
///
/// Each operation performs two sequential calls: geocode the city, then
/// fetch data at the resolved coordinates. No key is required, nothing is
/// cached, and no retries are attempted.
#[derive(Debug, Clone, Default)]
pub struct OpenMeteoProvider {
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }

    async fn geocode(&self, city: &str) -> Result<Coordinates> {
        let res = self
            .http
            .get(GEOCODING_URL)
            .query(&[
                ("name", city),
                ("count", "1"),
                ("language", "fr"),
                ("format", "json"),
            ])
            .timeout(HTTP_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("geocoding request failed: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| Error::Upstream(format!("failed to read geocoding response body: {e}")))?;

        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "geocoding request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        let parsed: GeocodingResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Upstream(format!("failed to parse geocoding JSON: {e}")))?;

        first_match(parsed, city)
    }

    async fn fetch_current(&self, coords: &Coordinates) -> Result<CurrentWeather> {
        let res = self
            .http
            .get(FORECAST_URL)
            .query(&[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("timezone", "auto".to_string()),
            ])
            .timeout(HTTP_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("current-weather request failed: {e}")))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            Error::Upstream(format!("failed to read current-weather response body: {e}"))
        })?;

        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "current-weather request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        let parsed: CurrentEnvelope = serde_json::from_str(&body)
            .map_err(|e| Error::Upstream(format!("failed to parse current-weather JSON: {e}")))?;

        let mut current = parsed.current;
        current.description = current.weather_code.map(describe_weather_code);
        Ok(current)
    }

    async fn fetch_daily(&self, coords: &Coordinates, days: i64) -> Result<ForecastResult> {
        let days = clamp_days(days);

        let res = self
            .http
            .get(FORECAST_URL)
            .query(&[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("forecast_days", days.to_string()),
                ("timezone", "auto".to_string()),
            ])
            .timeout(HTTP_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("forecast request failed: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| Error::Upstream(format!("failed to read forecast response body: {e}")))?;

        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "forecast request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        let parsed: DailyEnvelope = serde_json::from_str(&body)
            .map_err(|e| Error::Upstream(format!("failed to parse forecast JSON: {e}")))?;

        let daily = transpose_daily(parsed.daily.unwrap_or_default());

        Ok(ForecastResult {
            city: coords.name.clone(),
            coordinates: coords.clone(),
            days: daily.len(),
            daily,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn current(&self, city: &str) -> Result<CurrentReport> {
        let coords = self.geocode(city).await?;
        let current = self.fetch_current(&coords).await?;

        Ok(CurrentReport {
            city: coords.name.clone(),
            coordinates: coords,
            current,
        })
    }

    async fn forecast(&self, city: &str, days: i64) -> Result<ForecastResult> {
        let coords = self.geocode(city).await?;
        self.fetch_daily(&coords, days).await
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Option<Vec<GeocodingMatch>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingMatch {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    timezone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrentEnvelope {
    current: CurrentWeather,
}

#[derive(Debug, Deserialize)]
struct DailyEnvelope {
    #[serde(default)]
    daily: Option<DailyBlock>,
}

/// Open-Meteo's daily block: one array per field, indexed by day offset.
#[derive(Debug, Default, Deserialize)]
struct DailyBlock {
    #[serde(default)]
    time: Option<Vec<String>>,
    #[serde(default)]
    weather_code: Option<Vec<Option<i64>>>,
    #[serde(default)]
    temperature_2m_max: Option<Vec<Option<f64>>>,
    #[serde(default)]
    temperature_2m_min: Option<Vec<Option<f64>>>,
    #[serde(default)]
    precipitation_sum: Option<Vec<Option<f64>>>,
    #[serde(default)]
    wind_speed_10m_max: Option<Vec<Option<f64>>>,
}

fn clamp_days(days: i64) -> i64 {
    days.clamp(1, 16)
}

/// First geocoding match wins; no disambiguation. The display name falls
/// back to the input city when the match carries none.
fn first_match(parsed: GeocodingResponse, city: &str) -> Result<Coordinates> {
    let first = parsed
        .results
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| Error::CityNotFound(city.to_string()))?;

    Ok(Coordinates {
        latitude: first.latitude,
        longitude: first.longitude,
        name: first.name.unwrap_or_else(|| city.to_string()),
        country_code: first.country_code,
        timezone: first.timezone,
    })
}

/// Transpose parallel field arrays into one record per date. A field array
/// shorter than the date array (or absent entirely) yields `None` for the
/// affected days rather than an error.
fn transpose_daily(block: DailyBlock) -> Vec<DailyForecastItem> {
    let dates = block.time.unwrap_or_default();

    dates
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let code = column(&block.weather_code, i);
            DailyForecastItem {
                date,
                temp_min_c: column(&block.temperature_2m_min, i),
                temp_max_c: column(&block.temperature_2m_max, i),
                precipitation_sum_mm: column(&block.precipitation_sum, i),
                wind_speed_max_kmh: column(&block.wind_speed_10m_max, i),
                weather_code: code,
                description: code.map(describe_weather_code),
            }
        })
        .collect()
}

fn column<T: Copy>(field: &Option<Vec<Option<T>>>, index: usize) -> Option<T> {
    field.as_ref().and_then(|values| values.get(index)).copied().flatten()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        let head: String = body.chars().take(MAX).collect();
        format!("{head}...")
    } else {
        body.to_string()
    }
}
