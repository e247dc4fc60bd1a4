//! OpenAI Engine - CompletionEngine backed by an OpenAI-compatible chat API.
//!
//! Streams chat completions over Server-Sent Events and turns every content
//! delta into a [`PartialResult`].
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAiEngineConfig::new(secret_key)
//!     .with_model("gpt-3.5-turbo")
//!     .with_proxy("socks5://127.0.0.1:10808");
//!
//! let engine = OpenAiEngine::new(config)?;
//! ```
//!
//! # Streaming
//!
//! SSE lines are buffered across network reads, so a `data:` line split over
//! two reads is parsed once complete. Data lines that fail to parse are
//! delivered as per-chunk errors; `[DONE]` ends the call successfully. A last
//! line left without a newline when the body ends is still parsed.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Proxy, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use std::time::Duration;

use crate::domain::chat::{AskRequest, ConversationId, EngineKind, PartialResult};
use crate::ports::{CompletionEngine, DeliverySender, EngineError};

/// Configuration for the OpenAI engine.
#[derive(Debug, Clone)]
pub struct OpenAiEngineConfig {
    /// API key for authentication.
    secret_key: Secret<String>,
    /// Model to use (e.g., "gpt-3.5-turbo").
    pub model: String,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Optional http, https or socks5 proxy URL.
    pub proxy: Option<String>,
    /// Connection establishment timeout.
    pub connect_timeout: Duration,
}

impl OpenAiEngineConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: Secret::new(secret_key.into()),
            model: "gpt-3.5-turbo".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            proxy: None,
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Routes requests through a proxy.
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Sets the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    fn secret_key(&self) -> &str {
        self.secret_key.expose_secret()
    }
}

/// OpenAI-compatible chat completion engine.
pub struct OpenAiEngine {
    config: OpenAiEngineConfig,
    client: Client,
}

impl OpenAiEngine {
    /// Creates the engine and its HTTP client.
    ///
    /// The total call duration is bounded by the caller, not the client.
    pub fn new(config: OpenAiEngineConfig) -> Result<Self, EngineError> {
        let mut builder = Client::builder().connect_timeout(config.connect_timeout);

        if let Some(proxy) = config.proxy.as_deref().filter(|p| !p.is_empty()) {
            let proxy = Proxy::all(proxy)
                .map_err(|e| EngineError::Internal(format!("invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| EngineError::Internal(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn to_openai_request(&self, request: &AskRequest) -> OpenAiRequest {
        let mut messages = Vec::new();

        if let Some(system) = request.system_message() {
            messages.push(OpenAiMessage {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }

        messages.push(OpenAiMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        OpenAiRequest {
            model: self.config.model.clone(),
            messages,
            stream: true,
        }
    }

    async fn send_streaming_request(&self, request: &AskRequest) -> Result<Response, EngineError> {
        self.client
            .post(self.completions_url())
            .bearer_auth(self.config.secret_key())
            .json(&self.to_openai_request(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    EngineError::network(format!("connection failed: {}", e))
                } else {
                    EngineError::network(e.to_string())
                }
            })
    }

    async fn handle_response_status(response: Response) -> Result<Response, EngineError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_status(status.as_u16(), &body))
    }
}

#[async_trait]
impl CompletionEngine for OpenAiEngine {
    async fn ask(&self, request: AskRequest, deliveries: DeliverySender) -> Result<(), EngineError> {
        tracing::debug!(
            conversation_id = %request.conversation_id,
            model = %self.config.model,
            "sending chat completion request"
        );

        let response = self.send_streaming_request(&request).await?;
        let response = Self::handle_response_status(response).await?;

        let mut body = response.bytes_stream();
        let mut lines = SseLineBuffer::default();
        let mut assembler = CompletionAssembler::new(&request);

        while let Some(bytes) = body.next().await {
            let bytes = bytes.map_err(|e| EngineError::network(format!("stream error: {}", e)))?;

            for line in lines.push(&bytes) {
                if deliver_line(&line, &mut assembler, &deliveries).await?.is_break() {
                    return Ok(());
                }
            }
        }

        if let Some(line) = lines.finish() {
            deliver_line(&line, &mut assembler, &deliveries).await?;
        }

        Ok(())
    }

    fn kind(&self) -> EngineKind {
        EngineKind::ChatGpt
    }
}

/// Handles one complete SSE line. Breaks once the upstream signals `[DONE]`.
async fn deliver_line(
    line: &str,
    assembler: &mut CompletionAssembler,
    deliveries: &DeliverySender,
) -> Result<ControlFlow<()>, EngineError> {
    let data = match parse_sse_line(line) {
        None => return Ok(ControlFlow::Continue(())),
        Some(SseEvent::Done) => return Ok(ControlFlow::Break(())),
        Some(SseEvent::Data(data)) => data,
    };

    match serde_json::from_str::<StreamResponseChunk>(&data) {
        Ok(chunk) => {
            if let Some(error) = chunk.error {
                return Err(EngineError::rejected(error.message));
            }
            if let Some(result) = assembler.apply(chunk) {
                deliveries.chunk(result).await?;
            }
        }
        Err(e) => {
            deliveries
                .chunk_error(EngineError::parse(format!("failed to parse SSE chunk: {}", e)))
                .await?;
        }
    }

    Ok(ControlFlow::Continue(()))
}

/// Maps an unsuccessful HTTP status and its body to an engine error.
fn classify_status(status: u16, body: &str) -> EngineError {
    let message = upstream_error_message(body).unwrap_or_else(|| body.trim().to_string());

    match status {
        401 => EngineError::AuthenticationFailed,
        429 => EngineError::RateLimited(message),
        _ => EngineError::rejected(format!("upstream returned {}: {}", status, message)),
    }
}

/// Extracts `error.message` from an OpenAI error body.
fn upstream_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<UpstreamErrorBody>(body)
        .ok()
        .map(|parsed| parsed.error.message)
}

/// Accumulates SSE bytes and yields complete lines.
#[derive(Debug, Default)]
struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    /// Appends bytes and returns every line completed by them.
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line[..line.len() - 1]);
            lines.push(text.trim_end_matches('\r').to_string());
        }
        lines
    }

    /// Takes the unterminated last line, if any, once the stream has ended.
    fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.pending).trim_end_matches('\r').to_string();
        self.pending.clear();
        Some(line)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SseEvent {
    Data(String),
    Done,
}

/// Parses one SSE line; comments, blank lines and other fields yield `None`.
fn parse_sse_line(line: &str) -> Option<SseEvent> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data == "[DONE]" {
        Some(SseEvent::Done)
    } else if data.trim().is_empty() {
        None
    } else {
        Some(SseEvent::Data(data.to_string()))
    }
}

/// Builds partial results from upstream chunks for one request.
struct CompletionAssembler {
    message_id: String,
    parent_message_id: String,
    conversation_id: ConversationId,
    text_so_far: String,
    sequence_index: u32,
}

impl CompletionAssembler {
    fn new(request: &AskRequest) -> Self {
        Self {
            message_id: String::new(),
            parent_message_id: request.parent_message_id.clone().unwrap_or_default(),
            conversation_id: request.conversation_id.clone(),
            text_so_far: String::new(),
            sequence_index: 0,
        }
    }

    /// Returns the partial result for a chunk, or `None` when it carries
    /// neither content nor a finish reason.
    fn apply(&mut self, chunk: StreamResponseChunk) -> Option<PartialResult> {
        if let Some(id) = chunk.id.filter(|id| !id.is_empty()) {
            self.message_id = id;
        }

        let choice = chunk.choices.into_iter().next()?;
        let fragment = choice.delta.content.unwrap_or_default();
        let is_final = choice.finish_reason.is_some();

        if fragment.is_empty() && !is_final {
            return None;
        }

        self.sequence_index += 1;
        self.text_so_far.push_str(&fragment);

        Some(PartialResult {
            message_id: self.message_id.clone(),
            parent_message_id: self.parent_message_id.clone(),
            conversation_id: self.conversation_id.clone(),
            text_so_far: self.text_so_far.clone(),
            fragment,
            sequence_index: self.sequence_index,
            is_final,
        })
    }
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct StreamResponseChunk {
    id: Option<String>,
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<UpstreamError>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    error: UpstreamError,
}

#[derive(Debug, Deserialize)]
struct UpstreamError {
    message: String,
}
