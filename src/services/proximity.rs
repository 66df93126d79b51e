//! Radius filtering of catalogued properties.

use geo::{GeodesicDistance, Point};

use crate::models::{Coordinate, NearbyProperty, Property};

/// Search radius around the resolved location.
pub const SEARCH_RADIUS_KM: f64 = 50.0;

/// Geodesic distance on the WGS-84 ellipsoid, in kilometres.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let a = Point::new(a.lon, a.lat);
    let b = Point::new(b.lon, b.lat);
    a.geodesic_distance(&b) / 1000.0
}

/// Round a distance to two decimal places.
pub fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

/// Properties within `radius_km` of `origin`, nearest first.
///
/// The radius check uses the full-precision distance; rounding happens only
/// on the retained entries. Equal rounded distances keep catalog order.
pub fn nearby(origin: Coordinate, properties: &[Property], radius_km: f64) -> Vec<NearbyProperty> {
    let mut found: Vec<NearbyProperty> = properties
        .iter()
        .filter_map(|p| {
            let km = distance_km(origin, p.coordinate());
            (km <= radius_km).then(|| NearbyProperty {
                property: p.name.clone(),
                distance_km: round_km(km),
            })
        })
        .collect();

    found.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    found
}
