//! Offline geocoder backed by a configured name table.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{GeocodeError, Geocoder, Resolution};
use crate::models::Coordinate;

/// Case-insensitive `name -> coordinate` lookup.
#[derive(Debug, Clone, Default)]
pub struct GazetteerGeocoder {
    entries: HashMap<String, Coordinate>,
}

impl GazetteerGeocoder {
    pub fn new(entries: HashMap<String, Coordinate>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(name, coord)| (name.trim().to_lowercase(), coord))
            .collect();
        Self { entries }
    }

    pub fn lookup(&self, name: &str) -> Option<Coordinate> {
        self.entries.get(&name.trim().to_lowercase()).copied()
    }
}

#[async_trait]
impl Geocoder for GazetteerGeocoder {
    async fn geocode(&self, name: &str) -> Result<Resolution, GeocodeError> {
        Ok(self
            .lookup(name)
            .map_or(Resolution::NotFound, Resolution::Found))
    }
}
