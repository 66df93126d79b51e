//! nearby - find catalogued properties near a free-text location.
//!
//! A query is corrected against a vocabulary of known place names, geocoded,
//! and compared against a fixed property catalog. Properties within 50km are
//! returned nearest first, over HTTP (`GET /nearest-property`) or the CLI.

pub mod cli;
pub mod config;
pub mod models;
pub mod server;
pub mod services;
