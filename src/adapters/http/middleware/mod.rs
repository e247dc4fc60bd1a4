//! HTTP middleware for axum.
//!
//! - `cors` - Cross-origin access for the browser client

pub mod cors;

pub use cors::cors_layer;
