//! Application handlers.
//!
//! Handlers that orchestrate domain operations.

pub mod ask;

pub use ask::{
    AskHandler, AskHandlerConfig, AskOutcome, StreamFailure, StreamLimits, StreamTermination,
};
