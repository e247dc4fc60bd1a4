//! Adapters - Implementations of port interfaces.
//!
//! - `engine` - Completion engines (OpenAI-compatible, scripted)
//! - `http` - axum routes, handlers and the streaming body writer

pub mod engine;
pub mod http;

pub use engine::{OpenAiEngine, OpenAiEngineConfig, ScriptedEngine};
pub use http::{app_router, AppState};
