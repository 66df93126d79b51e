//! Configuration management for nearby.
//!
//! Settings come from three layers, later ones winning:
//! 1. Built-in defaults (public Nominatim, embedded catalog)
//! 2. A config file: `--config`, or auto-discovered via the prefer crate
//! 3. `NEARBY_*` environment variables (a `.env` file is loaded first)

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Catalog, CatalogError, CatalogFile, Coordinate, Property};

/// Public OpenStreetMap Nominatim instance.
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";

/// Bounded wait for a geocoder call, in seconds.
pub const DEFAULT_GEOCODER_TIMEOUT_SECS: u64 = 30;

/// Name used for config file discovery (`nearby.toml`, `nearby.yaml`, ...).
const CONFIG_NAME: &str = "nearby";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {message}")]
    Parse { path: PathBuf, message: String },
}

/// Which geocoding backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeocoderProvider {
    /// OpenStreetMap Nominatim over HTTP.
    #[default]
    Nominatim,
    /// Fixed table from `geocoder.gazetteer`, no network access.
    Gazetteer,
}

impl std::str::FromStr for GeocoderProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nominatim" | "osm" => Ok(Self::Nominatim),
            "gazetteer" | "static" => Ok(Self::Gazetteer),
            _ => Err(format!("Unknown geocoder provider: {}", s)),
        }
    }
}

/// Geocoder settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocoderConfig {
    pub provider: GeocoderProvider,
    /// Base URL of the Nominatim instance.
    pub endpoint: String,
    /// User-Agent sent with every request.
    pub user_agent: String,
    /// Bounded wait per call.
    pub timeout_secs: u64,
    /// Comma-separated ISO 3166-1 codes restricting results (e.g. "in").
    pub country_codes: Option<String>,
    /// Entries for the gazetteer provider.
    pub gazetteer: HashMap<String, Coordinate>,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            provider: GeocoderProvider::default(),
            endpoint: DEFAULT_GEOCODER_URL.to_string(),
            user_agent: default_user_agent(),
            timeout_secs: DEFAULT_GEOCODER_TIMEOUT_SECS,
            country_codes: None,
            gazetteer: HashMap::new(),
        }
    }
}

fn default_user_agent() -> String {
    format!("nearby/{}", env!("CARGO_PKG_VERSION"))
}

impl GeocoderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `NEARBY_GEOCODER`: "nominatim" or "gazetteer"
    /// - `NEARBY_GEOCODER_URL`: Nominatim base URL
    /// - `NEARBY_USER_AGENT`: User-Agent header
    /// - `NEARBY_GEOCODER_TIMEOUT`: timeout in seconds
    /// - `NEARBY_COUNTRY_CODES`: country restriction
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(val) = var("NEARBY_GEOCODER") {
            match val.parse::<GeocoderProvider>() {
                Ok(provider) => self.provider = provider,
                Err(e) => tracing::warn!("Ignoring NEARBY_GEOCODER: {}", e),
            }
        }
        if let Some(val) = var("NEARBY_GEOCODER_URL") {
            self.endpoint = val;
        }
        if let Some(val) = var("NEARBY_USER_AGENT") {
            self.user_agent = val;
        }
        if let Some(val) = var("NEARBY_GEOCODER_TIMEOUT") {
            match val.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.timeout_secs = secs,
                _ => tracing::warn!("Ignoring invalid NEARBY_GEOCODER_TIMEOUT value: {}", val),
            }
        }
        if let Some(val) = var("NEARBY_COUNTRY_CODES") {
            self.country_codes = Some(val);
        }
        self
    }
}

/// Where the property catalog comes from.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CatalogSource {
    /// Dataset embedded in the binary.
    #[default]
    Builtin,
    /// `locations`/`properties` written directly in the config file.
    Inline(CatalogFile),
    /// Standalone catalog file.
    Path(PathBuf),
}

/// Application settings.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub geocoder: GeocoderConfig,
    pub catalog: CatalogSource,
}

impl Settings {
    /// Load and validate the configured catalog.
    pub fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.catalog {
            CatalogSource::Builtin => Catalog::builtin(),
            CatalogSource::Inline(file) => Catalog::from_file(file.clone()),
            CatalogSource::Path(path) => Catalog::load(path),
        }
    }
}

/// `[geocoder]` section of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeocoderSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<GeocoderProvider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_codes: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub gazetteer: HashMap<String, Coordinate>,
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub geocoder: GeocoderSection,
    /// Path to a standalone catalog file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
    /// Inline vocabulary (replaces the built-in catalog).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<String>>,
    /// Inline properties (replaces the built-in catalog).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<Property>>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Auto-discover a config file using the prefer crate.
    ///
    /// A discovered file that fails to parse is logged and ignored.
    pub async fn discover() -> Self {
        match prefer::load(CONFIG_NAME).await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("{}; using defaults", e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::parse(&contents, path)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
        let parsed = match ext {
            "json" => serde_json::from_str(contents).map_err(|e| e.to_string()),
            "yaml" | "yml" => serde_yaml::from_str(contents).map_err(|e| e.to_string()),
            _ => toml::from_str(contents).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Directory of the config file, used to resolve relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        let section = &self.geocoder;
        if let Some(provider) = section.provider {
            settings.geocoder.provider = provider;
        }
        if let Some(ref endpoint) = section.endpoint {
            settings.geocoder.endpoint = endpoint.clone();
        }
        if let Some(ref user_agent) = section.user_agent {
            settings.geocoder.user_agent = user_agent.clone();
        }
        match section.timeout_secs {
            Some(0) => tracing::warn!("Ignoring invalid geocoder.timeout_secs value: 0"),
            Some(timeout) => settings.geocoder.timeout_secs = timeout,
            None => {}
        }
        if let Some(ref codes) = section.country_codes {
            settings.geocoder.country_codes = Some(codes.clone());
        }
        if !section.gazetteer.is_empty() {
            settings.geocoder.gazetteer = section.gazetteer.clone();
        }

        if let Some(ref catalog) = self.catalog {
            settings.catalog = CatalogSource::Path(self.resolve_path(catalog, base_dir));
        } else if self.locations.is_some() || self.properties.is_some() {
            settings.catalog = CatalogSource::Inline(CatalogFile {
                locations: self.locations.clone().unwrap_or_default(),
                properties: self.properties.clone().unwrap_or_default(),
            });
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
}

/// Load settings from config file and environment.
///
/// An explicitly named config file must exist and parse.
pub async fn load_settings(options: &LoadOptions) -> Result<Settings, ConfigError> {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await?,
        None => Config::discover().await,
    };

    if let Some(ref path) = config.source_path {
        tracing::debug!("Loaded config from {}", path.display());
    }

    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);
    settings.geocoder = settings.geocoder.with_env_overrides();

    Ok(settings)
}
