//! Ask handler.
//!
//! Drives one completion engine call per request and turns its deliveries
//! into stream frames. The engine runs on its own task and pushes deliveries
//! into a bounded channel; this handler is the channel's only consumer, so
//! frames reach the sink one at a time and in delivery order.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use crate::domain::chat::{AskRequest, ChunkErrorPolicy, EngineKind, PartialResult, StreamState};
use crate::ports::{CompletionEngine, Delivery, DeliverySender, EngineError, FrameSink, SinkError};

/// Optional caps on one response's size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamLimits {
    /// Maximum number of chunk frames.
    pub max_frames: Option<usize>,
    /// Maximum number of bytes written before the stream is cut off.
    pub max_bytes: Option<usize>,
}

impl StreamLimits {
    /// Returns a budget message when writing another chunk would exceed `max_frames`.
    fn frames_exhausted(&self, state: &StreamState) -> Option<String> {
        let max = self.max_frames?;
        (state.frames_written >= max)
            .then(|| format!("stream budget exceeded: more than {} frames", max))
    }

    /// Returns a budget message when the bytes written exceed `max_bytes`.
    fn bytes_exhausted(&self, state: &StreamState) -> Option<String> {
        let max = self.max_bytes?;
        (state.bytes_written > max).then(|| {
            format!(
                "stream budget exceeded: {} bytes written, limit is {}",
                state.bytes_written, max
            )
        })
    }
}

/// Configuration for the ask handler.
#[derive(Debug, Clone)]
pub struct AskHandlerConfig {
    /// Upper bound on one engine call.
    pub engine_timeout: Duration,
    /// Capacity of the delivery channel.
    pub delivery_buffer: usize,
    /// Handling of per-chunk delivery errors.
    pub chunk_error_policy: ChunkErrorPolicy,
    /// Response size caps.
    pub limits: StreamLimits,
}

impl Default for AskHandlerConfig {
    fn default() -> Self {
        Self {
            engine_timeout: Duration::from_secs(60),
            delivery_buffer: 32,
            chunk_error_policy: ChunkErrorPolicy::Skip,
            limits: StreamLimits::default(),
        }
    }
}

/// How a stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamTermination {
    /// The engine call returned successfully.
    Completed,
    /// A failure frame was written as the last frame.
    Failed(StreamFailure),
    /// The client went away; the engine call was cancelled.
    Disconnected,
}

/// Reason a failure frame was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFailure {
    /// The engine call itself failed.
    Engine(String),
    /// A per-chunk error under [`ChunkErrorPolicy::Abort`].
    ChunkRejected(String),
    /// A [`StreamLimits`] cap was hit.
    LimitExceeded(String),
    /// A chunk frame could not be encoded.
    Encoding(String),
}

impl StreamFailure {
    /// Message carried by the failure frame.
    pub fn message(&self) -> &str {
        match self {
            StreamFailure::Engine(m)
            | StreamFailure::ChunkRejected(m)
            | StreamFailure::LimitExceeded(m)
            | StreamFailure::Encoding(m) => m,
        }
    }
}

/// Result of handling one ask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskOutcome {
    /// Final stream bookkeeping.
    pub state: StreamState,
    pub termination: StreamTermination,
}

/// Handler for streaming asks.
pub struct AskHandler {
    engine: Arc<dyn CompletionEngine>,
    config: AskHandlerConfig,
}

impl AskHandler {
    /// Creates a new handler with the default configuration.
    pub fn new(engine: Arc<dyn CompletionEngine>) -> Self {
        Self::with_config(engine, AskHandlerConfig::default())
    }

    /// Creates a handler with custom configuration.
    pub fn with_config(engine: Arc<dyn CompletionEngine>, config: AskHandlerConfig) -> Self {
        Self { engine, config }
    }

    /// Engine family answering this handler's asks.
    pub fn engine_kind(&self) -> EngineKind {
        self.engine.kind()
    }

    /// Runs one engine call and writes its frames to `sink`.
    ///
    /// Never fails: every terminal condition that can still reach the client
    /// is written as a failure frame, and the outcome says which one it was.
    pub async fn handle(&self, request: AskRequest, sink: &mut dyn FrameSink) -> AskOutcome {
        let conversation_id = request.conversation_id.to_string();
        let engine_kind = request.engine_kind;

        debug!(conversation_id = %conversation_id, engine = %engine_kind, "starting engine call");

        let mut call = EngineCall::start(self.engine.clone(), request, &self.config);
        let mut state = StreamState::new();

        loop {
            let event = tokio::select! {
                event = call.next_event() => event,
                _ = sink.closed() => return disconnected(&conversation_id, state),
            };
            let Some(event) = event else { break };

            match event {
                AskEvent::Chunk(result) => {
                    if let Some(message) = self.config.limits.frames_exhausted(&state) {
                        return self.fail(sink, state, StreamFailure::LimitExceeded(message)).await;
                    }

                    match sink
                        .emit_chunk(&result, &conversation_id, engine_kind, &state)
                        .await
                    {
                        Ok(bytes) => state.record_chunk(result.sequence_index, bytes),
                        Err(SinkError::Disconnected) => return disconnected(&conversation_id, state),
                        Err(err) => {
                            return self
                                .fail(sink, state, StreamFailure::Encoding(err.to_string()))
                                .await
                        }
                    }

                    if let Some(message) = self.config.limits.bytes_exhausted(&state) {
                        return self.fail(sink, state, StreamFailure::LimitExceeded(message)).await;
                    }
                }
                AskEvent::ChunkFailed(err) => match self.config.chunk_error_policy {
                    ChunkErrorPolicy::Skip => {
                        warn!(
                            conversation_id = %conversation_id,
                            error = %err,
                            "dropping chunk delivery error"
                        );
                    }
                    ChunkErrorPolicy::Abort => {
                        return self
                            .fail(sink, state, StreamFailure::ChunkRejected(err.to_string()))
                            .await;
                    }
                },
                AskEvent::Finished(Ok(())) => {
                    debug!(
                        conversation_id = %conversation_id,
                        frames = state.frames_written,
                        bytes = state.bytes_written,
                        "engine call completed"
                    );
                    return AskOutcome {
                        state,
                        termination: StreamTermination::Completed,
                    };
                }
                AskEvent::Finished(Err(err)) => {
                    warn!(conversation_id = %conversation_id, error = %err, "engine call failed");
                    return self.fail(sink, state, StreamFailure::Engine(err.to_string())).await;
                }
            }
        }

        AskOutcome {
            state,
            termination: StreamTermination::Completed,
        }
    }

    /// Writes the terminal failure frame. The engine call, if still running,
    /// is cancelled when the caller drops it.
    async fn fail(
        &self,
        sink: &mut dyn FrameSink,
        mut state: StreamState,
        failure: StreamFailure,
    ) -> AskOutcome {
        match sink.emit_failure(failure.message(), &state).await {
            Ok(bytes) => {
                state.record_frame(bytes);
                AskOutcome {
                    state,
                    termination: StreamTermination::Failed(failure),
                }
            }
            Err(err) => {
                info!(error = %err, failure = failure.message(), "failure frame not delivered");
                AskOutcome {
                    state,
                    termination: StreamTermination::Disconnected,
                }
            }
        }
    }
}

fn disconnected(conversation_id: &str, state: StreamState) -> AskOutcome {
    info!(
        conversation_id = %conversation_id,
        frames = state.frames_written,
        "client disconnected, cancelling engine call"
    );
    AskOutcome {
        state,
        termination: StreamTermination::Disconnected,
    }
}

/// One step of an engine call, in the order the handler must process them.
#[derive(Debug)]
enum AskEvent {
    Chunk(PartialResult),
    ChunkFailed(EngineError),
    Finished(Result<(), EngineError>),
}

impl From<Delivery> for AskEvent {
    fn from(delivery: Delivery) -> Self {
        match delivery {
            Ok(result) => AskEvent::Chunk(result),
            Err(err) => AskEvent::ChunkFailed(err),
        }
    }
}

/// A running engine call viewed as a finite sequence of [`AskEvent`]s.
///
/// Dropping it aborts the engine task.
struct EngineCall {
    deliveries: mpsc::Receiver<Delivery>,
    task: Option<JoinHandle<Result<(), EngineError>>>,
    result: Option<Result<(), EngineError>>,
    finished: bool,
}

impl EngineCall {
    fn start(engine: Arc<dyn CompletionEngine>, request: AskRequest, config: &AskHandlerConfig) -> Self {
        let (sender, deliveries) = DeliverySender::channel(config.delivery_buffer);
        let timeout = config.engine_timeout;

        let task = tokio::spawn(async move {
            match tokio::time::timeout(timeout, engine.ask(request, sender)).await {
                Ok(result) => result,
                Err(_) => Err(EngineError::Timeout {
                    timeout_secs: timeout.as_secs(),
                }),
            }
        });

        Self {
            deliveries,
            task: Some(task),
            result: None,
            finished: false,
        }
    }

    /// Returns the next event; `Finished` comes last, after every delivery
    /// the engine made before returning.
    async fn next_event(&mut self) -> Option<AskEvent> {
        if self.finished {
            return None;
        }

        if let Some(task) = self.task.as_mut() {
            tokio::select! {
                biased;
                Some(delivery) = self.deliveries.recv() => return Some(delivery.into()),
                joined = task => {
                    self.task = None;
                    self.result = Some(flatten_join(joined));
                }
            }
        }

        if let Ok(delivery) = self.deliveries.try_recv() {
            return Some(delivery.into());
        }

        self.finished = true;
        self.deliveries.close();
        Some(AskEvent::Finished(self.result.take().unwrap_or(Ok(()))))
    }
}

impl Drop for EngineCall {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn flatten_join(joined: Result<Result<(), EngineError>, JoinError>) -> Result<(), EngineError> {
    match joined {
        Ok(result) => result,
        Err(err) => Err(EngineError::Internal(err.to_string())),
    }
}
