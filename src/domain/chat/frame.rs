//! Stream frames written to the chat response body.
//!
//! Each frame is one self-contained JSON document. Frames after the first are
//! preceded by [`FRAME_SEPARATOR`] so clients can split the body on newlines.

use serde::{Deserialize, Serialize};

use super::{EngineKind, PartialResult};

/// Separator written before every frame except the first.
pub const FRAME_SEPARATOR: &str = "\n";

/// `object` value of every chunk frame's detail.
pub const CHUNK_OBJECT: &str = "chat.completion.chunk";

/// `status` value of failure frames.
pub const FAILURE_STATUS: &str = "fail";

/// A frame in the chat response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreamFrame {
    /// Incremental assistant output.
    AssistantChunk(AssistantChunkFrame),
    /// Terminal failure; always the last frame.
    Failure(FailureFrame),
}

/// Assistant output envelope for one partial result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantChunkFrame {
    pub role: String,
    pub id: String,
    #[serde(rename = "parentMessageId")]
    pub parent_message_id: String,
    #[serde(rename = "conversationId")]
    pub conversation_id: String,
    /// Full text generated so far.
    pub text: String,
    pub detail: ChunkDetail,
}

/// Completion-chunk shaped detail of an assistant frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkDetail {
    pub id: String,
    pub object: String,
    /// Unix seconds.
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkChoice {
    pub delta: ChunkDelta,
    pub index: u32,
    /// Completion flag. Boolean on this wire, not a reason string.
    pub finish_reason: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkDelta {
    pub content: String,
}

/// Terminal failure. Serializes as `{"message":..,"data":null,"status":"fail"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureFrame {
    pub message: String,
    pub data: Option<serde_json::Value>,
    pub status: String,
}

impl StreamFrame {
    /// Builds the assistant frame for a partial result.
    ///
    /// `conversation_id` is the request's resolved id, which takes precedence
    /// over whatever the engine echoed.
    pub fn chunk(
        result: &PartialResult,
        conversation_id: &str,
        engine: EngineKind,
        created: i64,
    ) -> Self {
        StreamFrame::AssistantChunk(AssistantChunkFrame {
            role: "assistant".to_string(),
            id: result.message_id.clone(),
            parent_message_id: result.parent_message_id.clone(),
            conversation_id: conversation_id.to_string(),
            text: result.text_so_far.clone(),
            detail: ChunkDetail {
                id: result.message_id.clone(),
                object: CHUNK_OBJECT.to_string(),
                created,
                model: engine.as_str().to_string(),
                choices: vec![ChunkChoice {
                    delta: ChunkDelta {
                        content: result.fragment.clone(),
                    },
                    index: 0,
                    finish_reason: result.is_final,
                }],
            },
        })
    }

    /// Builds a failure frame.
    pub fn failure(message: impl Into<String>) -> Self {
        StreamFrame::Failure(FailureFrame {
            message: message.into(),
            data: None,
            status: FAILURE_STATUS.to_string(),
        })
    }

    /// Returns true for failure frames.
    pub fn is_failure(&self) -> bool {
        matches!(self, StreamFrame::Failure(_))
    }

    /// Serializes the frame as one compact JSON document.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
