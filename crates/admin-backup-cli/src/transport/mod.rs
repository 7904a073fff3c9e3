//! Transports that carry module calls to a live admin panel.

pub mod http;

pub use http::WikidotConnector;
