use thiserror::Error;

/// Failures produced by the geocode-then-fetch pipeline.
///
/// Tool execution catches these at the dispatcher boundary and turns them
/// into in-band `{"error": ...}` payloads; they never become protocol-level
/// errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Geocoding returned no result for the requested city.
    #[error("Ville introuvable: {0}")]
    CityNotFound(String),

    /// The weather provider answered with a non-success status, an
    /// unreadable body, or a body that does not match the expected shape.
    #[error("Open-Meteo request failed: {0}")]
    Upstream(String),
}

/// Result alias using the crate error type.
pub type Result<T> = std::result::Result<T, Error>;
