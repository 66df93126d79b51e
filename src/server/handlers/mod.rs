//! HTTP request handlers for the web server.

mod nearest;

pub use nearest::nearest_property;
