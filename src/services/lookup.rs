//! The nearby-property lookup pipeline.
//!
//! normalize query -> geocode -> radius filter. Nothing is kept between calls;
//! the catalog is shared read-only and the geocoder is stateless from the
//! caller's point of view.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::geocode::{GeocodeError, Geocoder, Resolution};
use super::normalize::QueryNormalizer;
use super::proximity::{self, SEARCH_RADIUS_KM};
use crate::models::{Catalog, NearbyProperty};

/// Ways a lookup can end without a result list.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Query must not be empty.")]
    InvalidQuery,

    #[error("Location not found.")]
    NotFound,

    #[error("No properties available within 50km radius.")]
    EmptyResultSet,

    #[error(transparent)]
    Geocode(#[from] GeocodeError),
}

/// Shared lookup service used by the HTTP handler and the CLI.
#[derive(Clone)]
pub struct NearbyLookup {
    catalog: Arc<Catalog>,
    geocoder: Arc<dyn Geocoder>,
}

impl NearbyLookup {
    pub fn new(catalog: Arc<Catalog>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { catalog, geocoder }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Properties within 50 km of the place named by `query`, nearest first.
    pub async fn search(&self, query: &str) -> Result<Vec<NearbyProperty>, LookupError> {
        let name = QueryNormalizer::new(self.catalog.locations()).normalize(query)?;

        let origin = match self.geocoder.geocode(&name).await {
            Ok(Resolution::Found(coord)) => coord,
            Ok(Resolution::NotFound) => {
                debug!("No coordinates for '{}'", name);
                return Err(LookupError::NotFound);
            }
            Err(e) => {
                warn!("Geocoding '{}' failed: {}", name, e);
                return Err(e.into());
            }
        };

        let found = proximity::nearby(origin, self.catalog.properties(), SEARCH_RADIUS_KM);
        info!(
            "Query '{}' resolved to '{}' at {}: {} properties in range",
            query.trim(),
            name,
            origin,
            found.len()
        );

        if found.is_empty() {
            return Err(LookupError::EmptyResultSet);
        }
        Ok(found)
    }
}
