//! HTTP adapters - the relay's REST and streaming surface.
//!
//! - `chat` - `POST /chat-process`, the streaming endpoint
//! - `meta` - liveness and capability endpoints for the web client

pub mod chat;
pub mod meta;
pub mod middleware;
mod shutdown;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::application::handlers::AskHandler;

pub use chat::{chat_router, ChatAppState, StreamWriter};
pub use meta::{meta_router, MetaAppState};
pub use middleware::cors_layer;
pub use shutdown::shutdown_on;

/// Everything the HTTP surface needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub ask_handler: Arc<AskHandler>,
    /// Advertised by `/config`.
    pub engine_timeout: std::time::Duration,
    /// Allowed CORS origins; empty allows any.
    pub cors_origins: Vec<String>,
}

/// Builds the full application router.
pub fn app_router(state: AppState) -> Router {
    let chat = chat_router(ChatAppState::new(state.ask_handler));
    let meta = meta_router(MetaAppState::new(state.engine_timeout));

    Router::new()
        .merge(chat)
        .merge(meta)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.cors_origins))
}
