//! JSON bodies returned by the nearest-property endpoint.

use serde::Serialize;

use crate::models::NearbyProperty;
use crate::services::LookupError;

/// Response body, one variant per outcome.
///
/// Serialized untagged so each variant is a single-key object:
/// `nearby_properties`, `message` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NearestPropertyResponse {
    Found {
        nearby_properties: Vec<NearbyProperty>,
    },
    Message {
        message: String,
    },
    Error {
        error: String,
    },
}

impl NearestPropertyResponse {
    /// Map a lookup outcome to its response body.
    ///
    /// "Not found" and "nothing in range" are ordinary answers and become a
    /// `message`; every other failure becomes an `error` carrying its
    /// description.
    pub fn from_outcome(outcome: Result<Vec<NearbyProperty>, LookupError>) -> Self {
        match outcome {
            Ok(nearby_properties) => Self::Found { nearby_properties },
            Err(e @ (LookupError::NotFound | LookupError::EmptyResultSet)) => Self::Message {
                message: e.to_string(),
            },
            Err(e) => Self::Error {
                error: e.to_string(),
            },
        }
    }
}
