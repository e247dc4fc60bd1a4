//! HTTP routes for the capability and liveness endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{config, ping, session, verify, MetaAppState};

/// Creates the router for `/ping`, `/config`, `/session` and `/verify`.
pub fn meta_router(state: MetaAppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/config", post(config))
        .route("/session", post(session))
        .route("/verify", post(verify))
        .with_state(state)
}
