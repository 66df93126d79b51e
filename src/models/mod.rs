//! Data models for nearby.

mod catalog;
mod property;

pub use catalog::{Catalog, CatalogError, CatalogFile};
pub use property::{Coordinate, NearbyProperty, Property};
