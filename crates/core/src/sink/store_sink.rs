//! Object store sink.

use async_trait::async_trait;
use object_store::buffered::BufWriter;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};

use super::traits::{ByteSink, StagedUpload};
use super::CHUNK_SIZE;
use crate::pipeline::{ByteReader, PipelineConfig, PipelineError};

/// Streams into `bucket/key` with an upload of unknown length.
///
/// Output smaller than the buffer goes up as a single put at commit time;
/// anything larger switches to a multipart upload whose parts are sent while
/// the transform is still running. Until commit, the object is not visible.
pub struct ObjectStoreSink {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    key: String,
    buffer_bytes: usize,
}

impl ObjectStoreSink {
    /// Creates a sink for `key` in `store`, which is bound to `bucket`.
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            key: key.into(),
            buffer_bytes: PipelineConfig::default().upload_buffer_bytes,
        }
    }

    /// Sets the in-memory buffer / part size.
    pub fn with_buffer(mut self, bytes: usize) -> Self {
        self.buffer_bytes = bytes;
        self
    }

    fn store_error(&self, reason: impl ToString) -> PipelineError {
        PipelineError::store(&self.bucket, &self.key, reason)
    }
}

#[async_trait]
impl ByteSink for ObjectStoreSink {
    fn describe(&self) -> String {
        format!("{}/{}", self.bucket, self.key)
    }

    async fn consume(&self, mut reader: ByteReader) -> Result<Box<dyn StagedUpload>, PipelineError> {
        let path = ObjectPath::from(self.key.as_str());
        let mut writer = BufWriter::with_capacity(Arc::clone(&self.store), path, self.buffer_bytes);
        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut total = 0u64;

        loop {
            let read = match reader.read(&mut buffer).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    discard(&mut writer, &self.describe()).await;
                    return Err(PipelineError::SinkIo(e));
                }
            };

            if let Err(e) = writer.write_all(&buffer[..read]).await {
                discard(&mut writer, &self.describe()).await;
                return Err(self.store_error(e));
            }
            total += read as u64;
        }

        debug!(destination = %self.describe(), bytes = total, "Output staged");

        Ok(Box::new(ObjectStoreUpload {
            writer,
            bucket: self.bucket.clone(),
            key: self.key.clone(),
            bytes: total,
        }))
    }
}

async fn discard(writer: &mut BufWriter, destination: &str) {
    if let Err(e) = writer.abort().await {
        warn!(destination = %destination, error = %e, "Failed to abort staged upload");
    }
}

struct ObjectStoreUpload {
    writer: BufWriter,
    bucket: String,
    key: String,
    bytes: u64,
}

#[async_trait]
impl StagedUpload for ObjectStoreUpload {
    fn bytes(&self) -> u64 {
        self.bytes
    }

    async fn commit(mut self: Box<Self>) -> Result<u64, PipelineError> {
        self.writer
            .shutdown()
            .await
            .map_err(|e| PipelineError::store(&self.bucket, &self.key, e))?;
        Ok(self.bytes)
    }

    async fn abort(mut self: Box<Self>) -> Result<(), PipelineError> {
        self.writer
            .abort()
            .await
            .map_err(|e| PipelineError::store(&self.bucket, &self.key, e))
    }
}
