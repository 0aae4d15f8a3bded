//! Scripted byte source.

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::pipeline::{ByteWriter, PipelineError};
use crate::source::ByteSource;

/// How a [`StaticSource`] ends its stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceBehavior {
    /// Deliver everything, then close.
    Complete,
    /// Deliver this many bytes, then fail as a fetch error.
    FailAfter(usize),
    /// Deliver this many bytes, then never finish.
    StallAfter(usize),
    /// Deliver this many bytes, then panic.
    PanicAfter(usize),
}

/// Produces a fixed payload in chunks.
#[derive(Debug, Clone)]
pub struct StaticSource {
    data: Vec<u8>,
    chunk_size: usize,
    behavior: SourceBehavior,
}

impl StaticSource {
    /// Creates a source that delivers `data` and closes.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            chunk_size: 16 * 1024,
            behavior: SourceBehavior::Complete,
        }
    }

    /// Sets the write size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Sets how the stream ends.
    pub fn with_behavior(mut self, behavior: SourceBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    fn cutoff(&self) -> usize {
        match self.behavior {
            SourceBehavior::Complete => self.data.len(),
            SourceBehavior::FailAfter(n)
            | SourceBehavior::StallAfter(n)
            | SourceBehavior::PanicAfter(n) => n.min(self.data.len()),
        }
    }
}

#[async_trait]
impl ByteSource for StaticSource {
    fn describe(&self) -> String {
        format!("static:{}", self.data.len())
    }

    async fn produce(&self, mut writer: ByteWriter) -> Result<u64, PipelineError> {
        let cutoff = self.cutoff();
        let mut written = 0u64;

        for chunk in self.data[..cutoff].chunks(self.chunk_size) {
            writer
                .write_all(chunk)
                .await
                .map_err(PipelineError::SourceIo)?;
            written += chunk.len() as u64;
        }

        match self.behavior {
            SourceBehavior::Complete => {
                writer.shutdown().await.map_err(PipelineError::SourceIo)?;
                Ok(written)
            }
            SourceBehavior::FailAfter(_) => Err(PipelineError::fetch(
                self.describe(),
                "connection reset by peer",
            )),
            SourceBehavior::StallAfter(_) => {
                std::future::pending::<()>().await;
                Ok(written)
            }
            SourceBehavior::PanicAfter(_) => panic!("source panicked after {} bytes", written),
        }
    }
}
