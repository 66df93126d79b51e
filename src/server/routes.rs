//! Router configuration for the web server.

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the router. The API is a single read-only endpoint.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/nearest-property", get(handlers::nearest_property))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
