//! OpenStreetMap Nominatim geocoder.
//!
//! Issues `GET {endpoint}/search?q=..&format=json&limit=1` and takes the first
//! place in the response. Nominatim's usage policy requires an identifying
//! User-Agent, which comes from configuration.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::{GeocodeError, Geocoder, Resolution};
use crate::config::GeocoderConfig;
use crate::models::Coordinate;

/// A single entry of a Nominatim search response.
///
/// Nominatim encodes coordinates as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// HTTP client for a Nominatim instance.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    search_url: Url,
    country_codes: Option<String>,
    timeout: Duration,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let timeout = config.timeout();
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            search_url: search_url(&config.endpoint)?,
            country_codes: config.country_codes.clone(),
            timeout,
        })
    }

    fn request_url(&self, name: &str) -> Url {
        let mut url = self.search_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("q", name)
                .append_pair("format", "json")
                .append_pair("limit", "1");
            if let Some(ref codes) = self.country_codes {
                query.append_pair("countrycodes", codes);
            }
        }
        url
    }

    async fn search(&self, name: &str) -> Result<Resolution, GeocodeError> {
        let url = self.request_url(name);
        debug!("Geocoding '{}' via {}", name, self.search_url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                GeocodeError::Timeout(self.timeout)
            } else {
                GeocodeError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let places: Vec<Place> = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GeocodeError::Timeout(self.timeout)
            } else {
                GeocodeError::Parse(e.to_string())
            }
        })?;

        let Some(place) = places.into_iter().next() else {
            return Ok(Resolution::NotFound);
        };

        let lat = place
            .lat
            .parse::<f64>()
            .map_err(|e| GeocodeError::Parse(format!("latitude '{}': {}", place.lat, e)))?;
        let lon = place
            .lon
            .parse::<f64>()
            .map_err(|e| GeocodeError::Parse(format!("longitude '{}': {}", place.lon, e)))?;

        debug!(
            "Resolved '{}' to {} ({})",
            name,
            Coordinate::new(lat, lon),
            place.display_name.as_deref().unwrap_or("unnamed")
        );
        Ok(Resolution::Found(Coordinate::new(lat, lon)))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, name: &str) -> Result<Resolution, GeocodeError> {
        match tokio::time::timeout(self.timeout, self.search(name)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Geocoding '{}' exceeded {:?}", name, self.timeout);
                Err(GeocodeError::Timeout(self.timeout))
            }
        }
    }
}

/// `{endpoint}/search`, keeping any path prefix on the endpoint.
fn search_url(endpoint: &str) -> Result<Url, GeocodeError> {
    let mut base = Url::parse(endpoint)
        .map_err(|e| GeocodeError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
    if base.cannot_be_a_base() {
        return Err(GeocodeError::InvalidEndpoint(endpoint.to_string()));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("search")
        .map_err(|e| GeocodeError::InvalidEndpoint(format!("{}: {}", endpoint, e)))
}
