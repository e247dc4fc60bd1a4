//! Partial results delivered by a completion engine.

use super::ConversationId;

/// One incremental unit of generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialResult {
    /// Id of the assistant message being generated.
    pub message_id: String,
    /// Id of the message this one replies to (empty when unknown).
    pub parent_message_id: String,
    /// Conversation the message belongs to.
    pub conversation_id: ConversationId,
    /// Full text generated so far, including `fragment`.
    pub text_so_far: String,
    /// Text added by this delivery.
    pub fragment: String,
    /// 1-based position within the request's delivery sequence.
    pub sequence_index: u32,
    /// True on the last partial result of a successful generation.
    pub is_final: bool,
}
