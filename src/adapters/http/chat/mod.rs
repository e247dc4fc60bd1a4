//! HTTP adapter for the streaming chat endpoint.

mod dto;
mod handlers;
mod routes;
mod stream_writer;

pub use dto::{ChatProcessOptions, ChatProcessRequest, ErrorResponse};
pub use handlers::{chat_process, ChatAppState, RequestError, STREAM_CONTENT_TYPE};
pub use routes::chat_router;
pub use stream_writer::StreamWriter;
