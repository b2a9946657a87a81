//! Core library for the `meteo` MCP server and CLI.
//!
//! This crate defines:
//! - Shared domain models (coordinates, current conditions, daily forecast)
//! - The Open-Meteo provider (geocode a city, then fetch weather data)
//! - The callable tool registry and the JSON-RPC dispatcher behind it
//! - The stdio and HTTP transports that drive the dispatcher
//!
//! It is used by `meteo-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod rpc;
pub mod server;
pub mod tools;

pub use config::ServerConfig;
pub use error::{Error, Result};
pub use model::{Coordinates, CurrentReport, CurrentWeather, DailyForecastItem, ForecastResult};
pub use provider::{OpenMeteoProvider, WeatherProvider};
pub use rpc::Dispatcher;
