//! Domain layer containing the chat streaming types and rules.
//!
//! # Module Organization
//!
//! - `chat` - Conversation identity, partial results, stream frames and stream state
pub mod chat;
