//! Configuration for the pipeline module.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Deadline for one run, from process start to commit.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Bytes buffered by the object store sink before switching to a
    /// multipart upload. Also the size of each uploaded part.
    #[serde(default = "default_upload_buffer")]
    pub upload_buffer_bytes: usize,
}

fn default_timeout() -> u64 {
    300
}

fn default_upload_buffer() -> usize {
    10 * 1024 * 1024
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            upload_buffer_bytes: default_upload_buffer(),
        }
    }
}

impl PipelineConfig {
    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Sets the upload buffer size.
    pub fn with_upload_buffer(mut self, bytes: usize) -> Self {
        self.upload_buffer_bytes = bytes;
        self
    }

    /// The run deadline as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
