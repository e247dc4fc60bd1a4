//! Scripted completion engine for testing.
//!
//! Plays back a fixed script of deliveries, then returns a configured
//! terminal result. Lets tests drive the relay without a real engine.
//!
//! # Example
//!
//! ```ignore
//! let engine = ScriptedEngine::new()
//!     .with_chunk("Hel")
//!     .with_final_chunk("lo")
//!     .with_delay(Duration::from_millis(10));
//!
//! engine.ask(request, deliveries).await?;
//! ```

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;
use uuid::Uuid;

use crate::domain::chat::{AskRequest, EngineKind, PartialResult};
use crate::ports::{CompletionEngine, DeliverySender, EngineError};

/// One scripted engine action.
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Deliver a partial result with this fragment.
    Chunk { fragment: String, is_final: bool },
    /// Deliver a per-chunk error.
    ChunkError(EngineError),
    /// Pause before the next step.
    Delay(Duration),
}

/// Engine that replays a script for every call.
#[derive(Debug, Clone)]
pub struct ScriptedEngine {
    steps: Vec<ScriptStep>,
    outcome: Result<(), EngineError>,
    kind: EngineKind,
    /// Requests received, for verification.
    calls: Arc<Mutex<Vec<AskRequest>>>,
    /// Calls that ran their script to the end.
    finished: Arc<AtomicUsize>,
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedEngine {
    /// Creates an engine with an empty script that succeeds.
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            outcome: Ok(()),
            kind: EngineKind::ChatGpt,
            calls: Arc::new(Mutex::new(Vec::new())),
            finished: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Appends a non-final chunk.
    pub fn with_chunk(mut self, fragment: impl Into<String>) -> Self {
        self.steps.push(ScriptStep::Chunk {
            fragment: fragment.into(),
            is_final: false,
        });
        self
    }

    /// Appends a final chunk.
    pub fn with_final_chunk(mut self, fragment: impl Into<String>) -> Self {
        self.steps.push(ScriptStep::Chunk {
            fragment: fragment.into(),
            is_final: true,
        });
        self
    }

    /// Appends a per-chunk error delivery.
    pub fn with_chunk_error(mut self, error: EngineError) -> Self {
        self.steps.push(ScriptStep::ChunkError(error));
        self
    }

    /// Appends a pause.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.steps.push(ScriptStep::Delay(delay));
        self
    }

    /// Makes the call fail with `error` after the script has played.
    pub fn failing_with(mut self, error: EngineError) -> Self {
        self.outcome = Err(error);
        self
    }

    /// Returns the number of calls made to this engine.
    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    /// Returns all recorded requests.
    pub fn get_calls(&self) -> Vec<AskRequest> {
        self.lock_calls().clone()
    }

    /// Returns the number of calls that played their whole script.
    pub fn finished_count(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    fn lock_calls(&self) -> MutexGuard<'_, Vec<AskRequest>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CompletionEngine for ScriptedEngine {
    async fn ask(&self, request: AskRequest, deliveries: DeliverySender) -> Result<(), EngineError> {
        self.lock_calls().push(request.clone());

        let message_id = format!("chatcmpl-{}", Uuid::new_v4().simple());
        let parent_message_id = request.parent_message_id.clone().unwrap_or_default();
        let mut text_so_far = String::new();
        let mut sequence_index = 0;

        for step in &self.steps {
            match step {
                ScriptStep::Chunk { fragment, is_final } => {
                    sequence_index += 1;
                    text_so_far.push_str(fragment);
                    deliveries
                        .chunk(PartialResult {
                            message_id: message_id.clone(),
                            parent_message_id: parent_message_id.clone(),
                            conversation_id: request.conversation_id.clone(),
                            text_so_far: text_so_far.clone(),
                            fragment: fragment.clone(),
                            sequence_index,
                            is_final: *is_final,
                        })
                        .await?;
                }
                ScriptStep::ChunkError(error) => deliveries.chunk_error(error.clone()).await?,
                ScriptStep::Delay(delay) => sleep(*delay).await,
            }
        }

        self.finished.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }

    fn kind(&self) -> EngineKind {
        self.kind
    }
}
