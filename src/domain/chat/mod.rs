//! Chat streaming domain.
//!
//! Pure types and rules for turning completion engine output into the
//! newline-delimited JSON frames a browser client consumes.

mod ask_request;
mod chunk_error_policy;
mod conversation;
mod frame;
mod partial_result;
mod stream_state;

pub use ask_request::{AskRequest, EngineKind};
pub use chunk_error_policy::ChunkErrorPolicy;
pub use conversation::ConversationId;
pub use frame::{
    AssistantChunkFrame, ChunkChoice, ChunkDelta, ChunkDetail, FailureFrame, StreamFrame,
    CHUNK_OBJECT, FAILURE_STATUS, FRAME_SEPARATOR,
};
pub use partial_result::PartialResult;
pub use stream_state::StreamState;
