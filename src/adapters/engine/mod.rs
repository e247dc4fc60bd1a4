//! Completion Engine Adapters.
//!
//! Implementations of the CompletionEngine port.
//!
//! ## Available Adapters
//!
//! - `OpenAiEngine` - OpenAI-compatible chat completions streamed over SSE
//! - `ScriptedEngine` - Replays a fixed script of deliveries for testing

mod openai_engine;
mod scripted_engine;

pub use openai_engine::{OpenAiEngine, OpenAiEngineConfig};
pub use scripted_engine::{ScriptStep, ScriptedEngine};
