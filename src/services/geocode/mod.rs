//! Resolution of place names to coordinates.
//!
//! The lookup pipeline talks to a [`Geocoder`]. Two implementations exist:
//! - [`NominatimGeocoder`]: OpenStreetMap Nominatim over HTTP (default)
//! - [`GazetteerGeocoder`]: fixed name table from configuration, no network

mod gazetteer;
mod nominatim;

pub use gazetteer::GazetteerGeocoder;
pub use nominatim::NominatimGeocoder;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{GeocoderConfig, GeocoderProvider};
use crate::models::Coordinate;

/// Outcome of a successful geocoder call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Found(Coordinate),
    NotFound,
}

/// Failures talking to a geocoding provider.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Geocoding service timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("Geocoding request failed: {0}")]
    Transport(String),

    #[error("Geocoding service returned HTTP {0}")]
    Status(u16),

    #[error("Failed to parse geocoding response: {0}")]
    Parse(String),

    #[error("Invalid geocoder endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Maps a place name to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve `name`. Not retried; the caller decides what a failure means.
    async fn geocode(&self, name: &str) -> Result<Resolution, GeocodeError>;
}

/// Build the geocoder selected by configuration.
pub fn from_config(config: &GeocoderConfig) -> Result<Arc<dyn Geocoder>, GeocodeError> {
    let geocoder: Arc<dyn Geocoder> = match config.provider {
        GeocoderProvider::Nominatim => Arc::new(NominatimGeocoder::new(config)?),
        GeocoderProvider::Gazetteer => Arc::new(GazetteerGeocoder::new(config.gazetteer.clone())),
    };
    Ok(geocoder)
}
