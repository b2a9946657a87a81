use crate::{
    error::Result,
    model::{CurrentReport, ForecastResult},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod open_meteo;

pub use open_meteo::OpenMeteoProvider;

/// Abstraction over the geocode-then-fetch weather pipeline.
///
/// The dispatcher only depends on this trait, so tool dispatch can be
/// exercised against a stub without touching the network.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for a city.
    async fn current(&self, city: &str) -> Result<CurrentReport>;

    /// Daily forecast for a city over `days` days (clamped to 1..=16).
    async fn forecast(&self, city: &str, days: i64) -> Result<ForecastResult>;
}
