//! Completion Engine Port - Interface for chat-completion engines.
//!
//! The relay treats an engine purely as a capability: given an [`AskRequest`],
//! push zero or more partial results into a [`DeliverySender`], then return
//! success or failure.
//!
//! # Deliveries
//!
//! Each delivery is either a [`PartialResult`] or a per-chunk [`EngineError`].
//! A per-chunk error does not end the call; only the value returned from
//! [`CompletionEngine::ask`] is terminal.
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct EchoEngine;
//!
//! #[async_trait]
//! impl CompletionEngine for EchoEngine {
//!     async fn ask(&self, request: AskRequest, deliveries: DeliverySender) -> Result<(), EngineError> {
//!         deliveries.chunk(PartialResult { /* ... */ }).await
//!     }
//!
//!     fn kind(&self) -> EngineKind {
//!         EngineKind::ChatGpt
//!     }
//! }
//! ```

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::chat::{AskRequest, EngineKind, PartialResult};

/// Port for chat-completion engines.
///
/// One instance is shared by all requests, so implementations must be safe to
/// call concurrently.
#[async_trait]
pub trait CompletionEngine: Send + Sync {
    /// Runs one completion, delivering partial results as they become available.
    ///
    /// Returns once generation has finished or failed. Successful completion
    /// is signaled by the last partial result's `is_final` flag.
    async fn ask(&self, request: AskRequest, deliveries: DeliverySender) -> Result<(), EngineError>;

    /// Engine family served by this implementation.
    fn kind(&self) -> EngineKind;
}

/// One item pushed by an engine.
pub type Delivery = Result<PartialResult, EngineError>;

/// Sending half of an engine's delivery channel.
#[derive(Debug, Clone)]
pub struct DeliverySender {
    tx: mpsc::Sender<Delivery>,
}

impl DeliverySender {
    /// Creates a bounded delivery channel.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Delivery>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { tx }, rx)
    }

    /// Delivers a partial result.
    ///
    /// Fails with [`EngineError::DeliveryClosed`] once the consumer has stopped
    /// listening; engines should return promptly when that happens.
    pub async fn chunk(&self, result: PartialResult) -> Result<(), EngineError> {
        self.send(Ok(result)).await
    }

    /// Delivers a per-chunk error in place of a partial result.
    pub async fn chunk_error(&self, error: EngineError) -> Result<(), EngineError> {
        self.send(Err(error)).await
    }

    async fn send(&self, delivery: Delivery) -> Result<(), EngineError> {
        self.tx
            .send(delivery)
            .await
            .map_err(|_| EngineError::DeliveryClosed)
    }
}

/// Completion engine errors.
///
/// The display string of a terminal error becomes the failure frame message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The engine reported a failure in its own words.
    #[error("{0}")]
    Rejected(String),

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Rate limited by the upstream service.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Network error talking to the upstream service.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse upstream output.
    #[error("parse error: {0}")]
    Parse(String),

    /// The call exceeded its time budget.
    #[error("engine timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u64,
    },

    /// The engine task stopped abnormally.
    #[error("engine task failed: {0}")]
    Internal(String),

    /// The consumer stopped listening for deliveries.
    #[error("delivery channel closed")]
    DeliveryClosed,
}

impl EngineError {
    /// Creates an engine-reported failure.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
