//! CORS layer for the browser client.

use http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

/// Builds the CORS layer.
///
/// An empty origin list allows any origin. Methods and headers are always
/// unrestricted.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.trim().parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(allowed)
    }
}
