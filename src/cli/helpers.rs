//! Shared helper functions for CLI commands.

use std::sync::Arc;

use anyhow::Context;

use crate::config::Settings;
use crate::services::{geocode, NearbyLookup};

/// Load the catalog and geocoder described by `settings`.
pub fn build_lookup(settings: &Settings) -> anyhow::Result<NearbyLookup> {
    let catalog = settings
        .load_catalog()
        .context("Failed to load property catalog")?;
    tracing::debug!(
        "Catalog loaded: {} properties, {} known locations",
        catalog.properties().len(),
        catalog.locations().len()
    );

    let geocoder =
        geocode::from_config(&settings.geocoder).context("Failed to create geocoder")?;

    Ok(NearbyLookup::new(Arc::new(catalog), geocoder))
}

/// Truncate a string to at most `max_len` characters, appending "..." if cut.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Goa", 10), "Goa");
        assert_eq!(truncate("Moustache Mahabalipuram", 12), "Moustache...");
    }

    #[test]
    fn test_build_lookup_with_defaults() {
        let lookup = build_lookup(&Settings::default()).unwrap();
        assert!(!lookup.catalog().properties().is_empty());
    }
}
