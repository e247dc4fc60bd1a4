//! Conversation identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier correlating the turns of one conversation.
///
/// Clients may send any non-empty string; ids generated here are UUID v4.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Creates a new random ConversationId.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the supplied id when it is non-blank, otherwise a fresh one.
    ///
    /// The supplied value is reused verbatim, including surrounding whitespace.
    pub fn resolve(supplied: Option<&str>) -> Self {
        match supplied {
            Some(id) if !id.trim().is_empty() => Self(id.to_string()),
            _ => Self::generate(),
        }
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ConversationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_supplied_id_verbatim() {
        let id = ConversationId::resolve(Some("2d1fe5e1-fedc-4e2b-bf75-065b1da01abc"));
        assert_eq!(id.as_str(), "2d1fe5e1-fedc-4e2b-bf75-065b1da01abc");
    }

    #[test]
    fn reuses_non_uuid_ids() {
        let id = ConversationId::resolve(Some("my-thread"));
        assert_eq!(id.as_str(), "my-thread");
    }

    #[test]
    fn generates_uuid_v4_when_missing() {
        let id = ConversationId::resolve(None);
        let parsed = Uuid::parse_str(id.as_str()).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn generates_when_empty_or_blank() {
        for supplied in ["", "   "] {
            let id = ConversationId::resolve(Some(supplied));
            assert!(Uuid::parse_str(id.as_str()).is_ok());
        }
    }

    #[test]
    fn generated_ids_do_not_collide() {
        let ids: std::collections::HashSet<_> =
            (0..1000).map(|_| ConversationId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ConversationId::resolve(Some("abc"));
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }
}
