//! Application layer - Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    AskHandler, AskHandlerConfig, AskOutcome, StreamFailure, StreamLimits, StreamTermination,
};
