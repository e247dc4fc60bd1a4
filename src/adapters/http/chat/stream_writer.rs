//! Response body writer for streamed frames.
//!
//! Each frame is handed to the response body as its own chunk, so hyper
//! flushes it to the client as soon as it is written.

use std::convert::Infallible;

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use tokio::sync::mpsc;

use crate::domain::chat::{StreamFrame, StreamState};
use crate::ports::{FrameSink, SinkError};

/// Number of encoded frames buffered ahead of a slow client.
const BODY_BUFFER: usize = 16;

/// Writes frames of one response into its body.
#[derive(Debug)]
pub struct StreamWriter {
    tx: mpsc::Sender<Bytes>,
}

impl StreamWriter {
    /// Creates a writer and the response body it feeds.
    ///
    /// The body ends when the writer is dropped.
    pub fn channel() -> (Self, Body) {
        let (tx, rx) = mpsc::channel::<Bytes>(BODY_BUFFER);

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|bytes| (Ok::<_, Infallible>(bytes), rx))
        });

        (Self { tx }, Body::from_stream(stream))
    }
}

#[async_trait]
impl FrameSink for StreamWriter {
    async fn write_frame(&mut self, frame: &StreamFrame, state: &StreamState) -> Result<usize, SinkError> {
        let encoded = frame.encode()?;

        let mut chunk = String::with_capacity(encoded.len() + 1);
        chunk.push_str(state.separator());
        chunk.push_str(&encoded);
        let written = chunk.len();

        self.tx
            .send(Bytes::from(chunk))
            .await
            .map_err(|_| SinkError::Disconnected)?;

        Ok(written)
    }

    async fn closed(&self) {
        self.tx.closed().await
    }
}
