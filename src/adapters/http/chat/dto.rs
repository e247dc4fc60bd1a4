//! HTTP DTOs for the chat endpoint.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::chat::{AskRequest, ConversationId, EngineKind};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body of `POST /chat-process`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatProcessRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub prompt: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: ChatProcessOptions,
    #[serde(default)]
    pub system_message: Option<String>,
}

/// Conversation options sent by the client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatProcessOptions {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub parent_message_id: Option<String>,
    #[serde(default)]
    pub system_message: Option<String>,
}

/// Reads `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ChatProcessRequest {
    /// Decodes a request body. An empty body is the same as `{}`.
    pub fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
    }

    /// Builds the engine request, resolving the conversation id.
    pub fn into_ask_request(self, engine_kind: EngineKind) -> AskRequest {
        let conversation_id = ConversationId::resolve(self.options.conversation_id.as_deref());

        // The top-level field wins over the one nested in options.
        let system_message = self
            .system_message
            .filter(|m| !m.is_empty())
            .or(self.options.system_message)
            .unwrap_or_default();

        let mut request = AskRequest::new(conversation_id, self.prompt)
            .with_system_role_message(system_message)
            .with_engine_kind(engine_kind);

        if let Some(parent) = self.options.parent_message_id.filter(|p| !p.is_empty()) {
            request = request.with_parent_message_id(parent);
        }

        request
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Error body returned before any stream output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
