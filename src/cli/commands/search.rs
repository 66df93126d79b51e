//! One-shot lookup from the command line.

use crate::config::Settings;
use crate::server::NearestPropertyResponse;

use super::super::helpers::build_lookup;

/// Run a single lookup and print the response body the server would send.
pub async fn cmd_search(settings: &Settings, query: &str) -> anyhow::Result<()> {
    let lookup = build_lookup(settings)?;
    let outcome = lookup.search(query).await;
    let body = NearestPropertyResponse::from_outcome(outcome);

    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
