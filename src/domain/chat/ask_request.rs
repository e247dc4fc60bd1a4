//! The request handed to a completion engine.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ConversationId;

/// Engine family that serves a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    ChatGpt,
}

impl EngineKind {
    /// Wire name, echoed as the `model` of chunk frames.
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::ChatGpt => "chatgpt",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ask against a completion engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskRequest {
    /// Conversation this turn belongs to. Always resolved before construction.
    pub conversation_id: ConversationId,
    /// Message the client is replying to, if any.
    pub parent_message_id: Option<String>,
    /// User prompt text.
    pub prompt: String,
    /// System role message; empty means none.
    pub system_role_message: String,
    /// Engine family to use.
    pub engine_kind: EngineKind,
}

impl AskRequest {
    /// Creates a request for the given conversation and prompt.
    pub fn new(conversation_id: ConversationId, prompt: impl Into<String>) -> Self {
        Self {
            conversation_id,
            parent_message_id: None,
            prompt: prompt.into(),
            system_role_message: String::new(),
            engine_kind: EngineKind::default(),
        }
    }

    /// Sets the system role message.
    pub fn with_system_role_message(mut self, message: impl Into<String>) -> Self {
        self.system_role_message = message.into();
        self
    }

    /// Sets the parent message id.
    pub fn with_parent_message_id(mut self, parent: impl Into<String>) -> Self {
        self.parent_message_id = Some(parent.into());
        self
    }

    /// Sets the engine kind.
    pub fn with_engine_kind(mut self, kind: EngineKind) -> Self {
        self.engine_kind = kind;
        self
    }

    /// Returns the system role message when one was supplied.
    pub fn system_message(&self) -> Option<&str> {
        if self.system_role_message.trim().is_empty() {
            None
        } else {
            Some(&self.system_role_message)
        }
    }
}
