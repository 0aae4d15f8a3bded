//! Trait definitions for the source module.

use async_trait::async_trait;

use crate::pipeline::{ByteWriter, PipelineError};

/// A producer of bytes.
///
/// `produce` owns the writer, so the writable end is closed on every exit
/// path, success or failure. A reader on the other side sees end-of-stream
/// either way; the returned error is what tells the pipeline the stream is
/// incomplete.
#[async_trait]
pub trait ByteSource: Send + Sync {
    /// Human-readable origin, used in logs.
    fn describe(&self) -> String;

    /// Transfers all bytes into `writer`, returning the byte count.
    async fn produce(&self, writer: ByteWriter) -> Result<u64, PipelineError>;
}
