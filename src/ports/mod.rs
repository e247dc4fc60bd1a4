//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the chat domain and the outside world. Adapters implement these ports.
//!
//! - `CompletionEngine` - The external capability that generates completions
//! - `FrameSink` - Destination for encoded stream frames (the response body)

mod completion_engine;
mod frame_sink;

pub use completion_engine::{CompletionEngine, Delivery, DeliverySender, EngineError};
pub use frame_sink::{FrameSink, SinkError};
