//! HTTP handlers for the capability and liveness endpoints.
//!
//! None of these read the request body.

use std::time::Duration;

use axum::extract::State;
use axum::Json;

use super::dto::{ConfigResponse, PingResponse, SessionResponse, VerifyResponse};

/// Shared state for the capability endpoints.
#[derive(Debug, Clone)]
pub struct MetaAppState {
    /// Engine call timeout advertised to the client.
    pub engine_timeout: Duration,
}

impl MetaAppState {
    pub fn new(engine_timeout: Duration) -> Self {
        Self { engine_timeout }
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.engine_timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

/// GET /ping - Liveness probe
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse::default())
}

/// POST /config - Static capability descriptor
pub async fn config(State(state): State<MetaAppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse::new(state.timeout_ms()))
}

/// POST /session - Authentication requirements
pub async fn session() -> Json<SessionResponse> {
    Json(SessionResponse::default())
}

/// POST /verify - Token verification; nothing to verify
pub async fn verify() -> Json<VerifyResponse> {
    Json(VerifyResponse::default())
}
