//! Handling of per-chunk delivery errors.

use serde::Deserialize;

/// What to do when an engine delivers an error in place of a partial result.
///
/// Terminal engine errors are unaffected; they always end the stream with a
/// failure frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkErrorPolicy {
    /// Drop the delivery and keep streaming. Nothing reaches the client.
    #[default]
    Skip,
    /// End the stream with a failure frame and cancel the engine call.
    Abort,
}
