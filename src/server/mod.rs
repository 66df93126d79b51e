//! Web server exposing the nearest-property lookup.

mod handlers;
mod response;
mod routes;

pub use response::NearestPropertyResponse;
pub use routes::create_router;

use crate::services::NearbyLookup;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub lookup: NearbyLookup,
}

impl AppState {
    pub fn new(lookup: NearbyLookup) -> Self {
        Self { lookup }
    }
}

/// Start the web server.
pub async fn serve(lookup: NearbyLookup, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(AppState::new(lookup));

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    tracing::info!("Starting server at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::models::{Catalog, Coordinate, Property};
    use crate::services::geocode::GazetteerGeocoder;
    use crate::services::{GeocodeError, Geocoder, Resolution};

    fn test_catalog() -> Arc<Catalog> {
        Arc::new(
            Catalog::new(
                vec![
                    Property::new("Moustache Auroville", 12.0052, 79.8108),
                    Property::new("Moustache Pondicherry", 11.90, 79.83),
                    Property::new("Moustache Delhi", 28.6448, 77.2167),
                ],
                vec!["Puducherry".to_string(), "Auroville".to_string()],
            )
            .unwrap(),
        )
    }

    fn setup_test_app() -> axum::Router {
        let geocoder = GazetteerGeocoder::new(HashMap::from([
            ("Puducherry".to_string(), Coordinate::new(11.94, 79.81)),
            ("Lhasa".to_string(), Coordinate::new(29.65, 91.17)),
        ]));
        let lookup = NearbyLookup::new(test_catalog(), Arc::new(geocoder));
        create_router(AppState::new(lookup))
    }

    /// Times out on "Slowtown", otherwise resolves to Puducherry.
    struct FlakyGeocoder;

    #[async_trait]
    impl Geocoder for FlakyGeocoder {
        async fn geocode(&self, name: &str) -> Result<Resolution, GeocodeError> {
            if name == "Slowtown" {
                Err(GeocodeError::Timeout(Duration::from_secs(30)))
            } else {
                Ok(Resolution::Found(Coordinate::new(11.94, 79.81)))
            }
        }
    }

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_nearest_property_found() {
        let (status, json) =
            get_json(setup_test_app(), "/nearest-property?query=Pondicherry").await;

        assert_eq!(status, StatusCode::OK);
        let items = json["nearby_properties"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["property"], "Moustache Pondicherry");
        assert_eq!(items[1]["property"], "Moustache Auroville");

        let first = items[0]["distance_km"].as_f64().unwrap();
        let second = items[1]["distance_km"].as_f64().unwrap();
        assert!(first <= second);
        assert!((first - 4.9).abs() < 0.1);
    }

    #[tokio::test]
    async fn test_nearest_property_location_not_found() {
        let (status, json) =
            get_json(setup_test_app(), "/nearest-property?query=qwxzv%20plorp").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({"message": "Location not found."}));
    }

    #[tokio::test]
    async fn test_nearest_property_out_of_range() {
        let (status, json) = get_json(setup_test_app(), "/nearest-property?query=Lhasa").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            serde_json::json!({"message": "No properties available within 50km radius."})
        );
    }

    #[tokio::test]
    async fn test_nearest_property_missing_query() {
        let (status, json) = get_json(setup_test_app(), "/nearest-property").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({"error": "Query must not be empty."}));
    }

    #[tokio::test]
    async fn test_repeated_query_uses_last_value() {
        let (status, json) = get_json(
            setup_test_app(),
            "/nearest-property?query=Puducherry&query=Lhasa",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            serde_json::json!({"message": "No properties available within 50km radius."})
        );

        let (status, json) = get_json(
            setup_test_app(),
            "/nearest-property?query=Lhasa&query=Puducherry",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["nearby_properties"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_timeout_then_service_still_answers() {
        let lookup = NearbyLookup::new(test_catalog(), Arc::new(FlakyGeocoder));
        let app = create_router(AppState::new(lookup));

        let (status, json) =
            get_json(app.clone(), "/nearest-property?query=Slowtown").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            serde_json::json!({"error": "Geocoding service timed out after 30s"})
        );

        let (status, json) = get_json(app, "/nearest-property?query=Puducherry").await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["nearby_properties"].is_array());
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = setup_test_app()
            .oneshot(Request::builder().uri("/properties").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
