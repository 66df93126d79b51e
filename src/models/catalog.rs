//! The static property catalog and known-location vocabulary.
//!
//! A catalog is built once at startup and shared read-only between requests.
//! The default dataset is embedded at compile time; a config file may replace
//! it with its own `locations` and `properties`.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::property::Property;

static DEFAULT_CATALOG: &str = include_str!("../../data/catalog.toml");

/// Errors raised while loading or validating a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Duplicate property name: {0}")]
    DuplicateProperty(String),

    #[error("Property name must not be empty")]
    EmptyName,

    #[error("Property '{name}' has invalid coordinates ({lat}, {lon})")]
    InvalidCoordinate { name: String, lat: f64, lon: f64 },

    #[error("Failed to parse catalog: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// On-disk shape of a catalog (inline in a config file or standalone).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

/// Validated, immutable property list plus vocabulary.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    properties: Vec<Property>,
    locations: Vec<String>,
}

impl Catalog {
    /// Build a catalog, validating every property.
    ///
    /// Blank vocabulary entries are dropped; the remaining order is kept since
    /// it decides ties in fuzzy matching.
    pub fn new(properties: Vec<Property>, locations: Vec<String>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(properties.len());
        for property in &properties {
            if property.name.trim().is_empty() {
                return Err(CatalogError::EmptyName);
            }
            if !property.coordinate().is_valid() {
                return Err(CatalogError::InvalidCoordinate {
                    name: property.name.clone(),
                    lat: property.lat,
                    lon: property.lon,
                });
            }
            if !seen.insert(property.name.as_str()) {
                return Err(CatalogError::DuplicateProperty(property.name.clone()));
            }
        }

        let locations = locations
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();

        Ok(Self {
            properties,
            locations,
        })
    }

    /// The dataset embedded in the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml(DEFAULT_CATALOG)
    }

    pub fn from_file(file: CatalogFile) -> Result<Self, CatalogError> {
        Self::new(file.properties, file.locations)
    }

    pub fn from_toml(contents: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            toml::from_str(contents).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::from_file(file)
    }

    /// Load a standalone catalog file (TOML, YAML or JSON by extension).
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

        let file: CatalogFile = match ext {
            "yaml" | "yml" => {
                serde_yaml::from_str(&contents).map_err(|e| CatalogError::Parse(e.to_string()))?
            }
            "json" => {
                serde_json::from_str(&contents).map_err(|e| CatalogError::Parse(e.to_string()))?
            }
            _ => toml::from_str(&contents).map_err(|e| CatalogError::Parse(e.to_string()))?,
        };
        Self::from_file(file)
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }
}
