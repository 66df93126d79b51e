//! `GET /nearest-property` handler.

use axum::{
    extract::{RawQuery, State},
    Json,
};
use url::form_urlencoded;

use super::super::response::NearestPropertyResponse;
use super::super::AppState;

/// Last `query` value in a raw query string.
///
/// Repeated parameters are not an error; the last one wins.
fn query_param(raw: Option<&str>) -> Option<String> {
    form_urlencoded::parse(raw?.as_bytes())
        .filter(|(key, _)| key == "query")
        .map(|(_, value)| value.into_owned())
        .last()
}

/// Properties within 50km of the queried location.
///
/// Every outcome is answered with HTTP 200; the body shape tells them apart.
/// A missing `query` parameter is handled like a blank one.
pub async fn nearest_property(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Json<NearestPropertyResponse> {
    let query = query_param(raw.as_deref()).unwrap_or_default();
    let outcome = state.lookup.search(&query).await;
    Json(NearestPropertyResponse::from_outcome(outcome))
}
