//! HTTP handler for the streaming chat endpoint.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{debug, info_span, Instrument};

use crate::application::handlers::AskHandler;

use super::dto::{ChatProcessRequest, ErrorResponse};
use super::stream_writer::StreamWriter;

/// Content type of the streamed frame body.
pub const STREAM_CONTENT_TYPE: &str = "application/octet-stream";

// ════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════

/// Shared state for the chat endpoint.
#[derive(Clone)]
pub struct ChatAppState {
    pub ask_handler: Arc<AskHandler>,
}

impl ChatAppState {
    pub fn new(ask_handler: Arc<AskHandler>) -> Self {
        Self { ask_handler }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

/// Request decoding failures, reported before any stream output.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("failed to read request body: {0}")]
    Unreadable(String),

    #[error("invalid request body: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<BytesRejection> for RequestError {
    fn from(rejection: BytesRejection) -> Self {
        RequestError::Unreadable(rejection.body_text())
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /chat-process - Stream the engine's answer as newline-separated frames
///
/// The response is committed as `200` once the body is returned; anything
/// that goes wrong afterwards is reported in-band as a failure frame.
pub async fn chat_process(
    State(state): State<ChatAppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, RequestError> {
    let body = body?;
    let request = ChatProcessRequest::from_body(&body)?
        .into_ask_request(state.ask_handler.engine_kind());

    let span = info_span!(
        "chat_process",
        conversation_id = %request.conversation_id,
        engine = %request.engine_kind,
    );

    let (mut writer, body) = StreamWriter::channel();
    let handler = state.ask_handler.clone();

    tokio::spawn(
        async move {
            let outcome = handler.handle(request, &mut writer).await;
            debug!(
                termination = ?outcome.termination,
                frames = outcome.state.frames_written,
                "response stream closed"
            );
        }
        .instrument(span),
    );

    Ok(([(header::CONTENT_TYPE, STREAM_CONTENT_TYPE)], body).into_response())
}
