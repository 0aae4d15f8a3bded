//! Recording byte sink.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;

use crate::pipeline::{ByteReader, PipelineError};
use crate::sink::{ByteSink, StagedUpload};

/// How a [`MockSink`] treats its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkBehavior {
    /// Read everything and stage it.
    Accept,
    /// Read this many bytes, then fail as a store error.
    FailAfter(usize),
    /// Stage normally, but fail the commit.
    RejectCommit,
    /// Stage normally, but never finish the commit.
    StallCommit,
}

#[derive(Debug, Default)]
struct Recorded {
    committed: Option<Vec<u8>>,
    commits: usize,
    aborts: usize,
}

/// Sink that keeps committed bytes in memory for assertions.
///
/// Clones share the recording, so keep one clone and hand the other to the
/// pipeline.
#[derive(Debug, Clone)]
pub struct MockSink {
    behavior: SinkBehavior,
    recorded: Arc<RwLock<Recorded>>,
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSink {
    /// Creates an accepting sink.
    pub fn new() -> Self {
        Self::with_behavior(SinkBehavior::Accept)
    }

    /// Creates a sink with scripted behavior.
    pub fn with_behavior(behavior: SinkBehavior) -> Self {
        Self {
            behavior,
            recorded: Arc::new(RwLock::new(Recorded::default())),
        }
    }

    /// The last committed payload, if any.
    pub async fn committed(&self) -> Option<Vec<u8>> {
        self.recorded.read().await.committed.clone()
    }

    /// Number of successful commits.
    pub async fn commit_count(&self) -> usize {
        self.recorded.read().await.commits
    }

    /// Number of staged payloads that were discarded.
    pub async fn abort_count(&self) -> usize {
        self.recorded.read().await.aborts
    }
}

#[async_trait]
impl ByteSink for MockSink {
    fn describe(&self) -> String {
        "mock".to_string()
    }

    async fn consume(&self, mut reader: ByteReader) -> Result<Box<dyn StagedUpload>, PipelineError> {
        let mut staged = Vec::new();

        match self.behavior {
            SinkBehavior::FailAfter(limit) => {
                let mut buf = vec![0u8; 4096];
                loop {
                    let n = reader.read(&mut buf).await.map_err(PipelineError::SinkIo)?;
                    if n == 0 {
                        break;
                    }
                    staged.extend_from_slice(&buf[..n]);
                    if staged.len() >= limit {
                        return Err(PipelineError::store("mock", "out", "quota exceeded"));
                    }
                }
            }
            SinkBehavior::Accept | SinkBehavior::RejectCommit | SinkBehavior::StallCommit => {
                reader
                    .read_to_end(&mut staged)
                    .await
                    .map_err(PipelineError::SinkIo)?;
            }
        }

        Ok(Box::new(MockUpload {
            data: staged,
            reject: self.behavior == SinkBehavior::RejectCommit,
            stall: self.behavior == SinkBehavior::StallCommit,
            recorded: Arc::clone(&self.recorded),
        }))
    }
}

struct MockUpload {
    data: Vec<u8>,
    reject: bool,
    stall: bool,
    recorded: Arc<RwLock<Recorded>>,
}

#[async_trait]
impl StagedUpload for MockUpload {
    fn bytes(&self) -> u64 {
        self.data.len() as u64
    }

    async fn commit(self: Box<Self>) -> Result<u64, PipelineError> {
        let MockUpload {
            data,
            reject,
            stall,
            recorded,
        } = *self;
        if stall {
            std::future::pending::<()>().await;
        }
        let mut recorded = recorded.write().await;
        if reject {
            recorded.aborts += 1;
            return Err(PipelineError::store("mock", "out", "access denied"));
        }
        let len = data.len() as u64;
        recorded.committed = Some(data);
        recorded.commits += 1;
        Ok(len)
    }

    async fn abort(self: Box<Self>) -> Result<(), PipelineError> {
        self.recorded.write().await.aborts += 1;
        Ok(())
    }
}
