//! Per-request stream bookkeeping.

use super::FRAME_SEPARATOR;

/// What has been written to one response so far.
///
/// Owned by the orchestrator for a single request and returned with its outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamState {
    /// Highest sequence index of a chunk that was written.
    pub last_sequence_index: u32,
    /// Frames written, including a failure frame.
    pub frames_written: usize,
    /// Bytes written, separators included.
    pub bytes_written: usize,
}

impl StreamState {
    /// Creates the state of an empty response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Separator to put before the next frame.
    ///
    /// Only the first frame of a response goes out without one.
    pub fn separator(&self) -> &'static str {
        if self.frames_written > 0 {
            FRAME_SEPARATOR
        } else {
            ""
        }
    }

    /// Records a written chunk frame.
    pub fn record_chunk(&mut self, sequence_index: u32, bytes: usize) {
        self.last_sequence_index = self.last_sequence_index.max(sequence_index);
        self.record_frame(bytes);
    }

    /// Records a written frame that carries no sequence index.
    pub fn record_frame(&mut self, bytes: usize) {
        self.frames_written += 1;
        self.bytes_written += bytes;
    }
}
