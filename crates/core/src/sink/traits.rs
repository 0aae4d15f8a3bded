//! Trait definitions for the sink module.

use async_trait::async_trait;

use crate::pipeline::{ByteReader, PipelineError};

/// A consumer of bytes.
#[async_trait]
pub trait ByteSink: Send + Sync {
    /// Human-readable destination, used in logs.
    fn describe(&self) -> String;

    /// Reads `reader` to end-of-stream into a staged destination.
    ///
    /// The reader is dropped (closed) before this returns. On error, any
    /// partially staged data has already been discarded.
    async fn consume(&self, reader: ByteReader) -> Result<Box<dyn StagedUpload>, PipelineError>;
}

/// Fully received data waiting for the pipeline's verdict.
#[async_trait]
pub trait StagedUpload: Send {
    /// Bytes staged so far.
    fn bytes(&self) -> u64;

    /// Makes the data visible at the destination, replacing any previous
    /// object. Returns the committed byte count.
    async fn commit(self: Box<Self>) -> Result<u64, PipelineError>;

    /// Discards the staged data.
    async fn abort(self: Box<Self>) -> Result<(), PipelineError>;
}
