//! End-to-end tests: config file -> Nominatim client -> router.
//!
//! A stub Nominatim is served from an ephemeral local port so the real HTTP
//! geocoder is exercised without network access.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::Query;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use tower::ServiceExt;

use nearby::config::{load_settings, LoadOptions};
use nearby::server::{create_router, AppState};
use nearby::services::{geocode, NearbyLookup};

async fn stub_search(Query(params): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
    match params.get("q").map(String::as_str) {
        // Only the corrected spelling is known to the stub
        Some("Puducherry") => Json(serde_json::json!([{
            "lat": "11.94",
            "lon": "79.81",
            "display_name": "Puducherry, India"
        }])),
        Some("Reykjavik") => Json(serde_json::json!([{
            "lat": "64.1466",
            "lon": "-21.9426"
        }])),
        Some("Slowtown") => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(serde_json::json!([]))
        }
        _ => Json(serde_json::json!([])),
    }
}

async fn spawn_stub() -> String {
    let app = Router::new().route("/search", get(stub_search));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn setup_app(dir: &tempfile::TempDir) -> Router {
    let endpoint = spawn_stub().await;
    let config_path = dir.path().join("nearby.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
catalog = "catalog.toml"

[geocoder]
endpoint = "{}"
user_agent = "nearby-integration-tests"
timeout_secs = 1
"#,
            endpoint
        ),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("catalog.toml"),
        r#"
locations = ["Puducherry", "Auroville", "Chennai"]

[[properties]]
name = "Moustache Auroville"
lat = 12.0052
lon = 79.8108

[[properties]]
name = "Moustache Pondicherry"
lat = 11.90
lon = 79.83

[[properties]]
name = "Moustache Chennai"
lat = 13.0418
lon = 80.2341
"#,
    )
    .unwrap();

    let settings = load_settings(&LoadOptions {
        config_path: Some(config_path),
    })
    .await
    .unwrap();

    let catalog = settings.load_catalog().unwrap();
    let geocoder = geocode::from_config(&settings.geocoder).unwrap();
    let lookup = NearbyLookup::new(Arc::new(catalog), geocoder);
    create_router(AppState::new(lookup))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
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
async fn test_misspelled_query_is_corrected_before_geocoding() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(&dir).await;

    let (status, json) = get_json(app, "/nearest-property?query=Pondicherry").await;
    assert_eq!(status, StatusCode::OK);

    let items = json["nearby_properties"].as_array().unwrap();
    let names: Vec<_> = items.iter().map(|i| i["property"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Moustache Pondicherry", "Moustache Auroville"]);

    let distances: Vec<f64> = items
        .iter()
        .map(|i| i["distance_km"].as_f64().unwrap())
        .collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    for d in &distances {
        // Two decimals at most
        assert!(((d * 100.0).round() - d * 100.0).abs() < 1e-6);
    }
}

#[tokio::test]
async fn test_unknown_location() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(&dir).await;

    let (status, json) = get_json(app, "/nearest-property?query=zzqx%20vlorp").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({"message": "Location not found."}));
}

#[tokio::test]
async fn test_location_far_from_every_property() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(&dir).await;

    let (status, json) = get_json(app, "/nearest-property?query=Reykjavik").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        serde_json::json!({"message": "No properties available within 50km radius."})
    );
}

#[tokio::test]
async fn test_geocoder_timeout_is_reported_and_service_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(&dir).await;

    let (status, json) = get_json(app.clone(), "/nearest-property?query=Slowtown").await;
    assert_eq!(status, StatusCode::OK);
    let error = json["error"].as_str().unwrap();
    assert!(error.contains("timed out"), "unexpected error: {}", error);

    let (status, json) = get_json(app, "/nearest-property?query=Puducherry").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["nearby_properties"].is_array());
}
