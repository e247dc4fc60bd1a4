//! Frame Sink Port - destination of a response's stream frames.

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::chat::{EngineKind, PartialResult, StreamFrame, StreamState};

/// Port for writing stream frames to one response.
///
/// Implementations encode the frame, prepend `state.separator()`, and deliver
/// the bytes to the client immediately. Every write returns the number of
/// bytes written.
#[async_trait]
pub trait FrameSink: Send + Sync {
    async fn write_frame(&mut self, frame: &StreamFrame, state: &StreamState) -> Result<usize, SinkError>;

    /// Writes the chunk frame for a partial result, stamped with the current time.
    async fn emit_chunk(
        &mut self,
        result: &PartialResult,
        conversation_id: &str,
        engine: EngineKind,
        state: &StreamState,
    ) -> Result<usize, SinkError> {
        let frame = StreamFrame::chunk(result, conversation_id, engine, Utc::now().timestamp());
        self.write_frame(&frame, state).await
    }

    /// Writes a failure frame carrying `message`.
    async fn emit_failure(&mut self, message: &str, state: &StreamState) -> Result<usize, SinkError> {
        self.write_frame(&StreamFrame::failure(message), state).await
    }

    /// Resolves once the client has stopped receiving.
    ///
    /// Sinks that cannot observe the client never resolve.
    async fn closed(&self) {
        futures::future::pending::<()>().await
    }
}

/// Frame sink errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    /// The client is no longer receiving the response body.
    #[error("client disconnected")]
    Disconnected,

    /// The frame could not be serialized.
    #[error("frame encoding failed: {0}")]
    Encode(String),
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        SinkError::Encode(err.to_string())
    }
}
