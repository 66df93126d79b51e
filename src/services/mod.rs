//! Services for resolving queries to nearby properties.

pub mod geocode;
pub mod lookup;
pub mod normalize;
pub mod proximity;

pub use geocode::{GeocodeError, Geocoder, Resolution};
pub use lookup::{LookupError, NearbyLookup};
