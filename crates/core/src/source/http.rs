//! HTTP(S) source.

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::traits::ByteSource;
use crate::pipeline::{ByteWriter, PipelineError};

/// Streams the body of a GET request.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    uri: String,
}

impl HttpSource {
    /// Creates a source for `uri` using a shared client.
    pub fn new(client: reqwest::Client, uri: impl Into<String>) -> Self {
        Self {
            client,
            uri: uri.into(),
        }
    }

    /// The URI being fetched.
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

#[async_trait]
impl ByteSource for HttpSource {
    fn describe(&self) -> String {
        self.uri.clone()
    }

    async fn produce(&self, mut writer: ByteWriter) -> Result<u64, PipelineError> {
        let mut response = self
            .client
            .get(&self.uri)
            .send()
            .await
            .map_err(|e| PipelineError::fetch(&self.uri, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::FetchStatus {
                uri: self.uri.clone(),
                status: status.as_u16(),
            });
        }

        let mut total = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| PipelineError::fetch(&self.uri, e))?
        {
            writer
                .write_all(&chunk)
                .await
                .map_err(PipelineError::SourceIo)?;
            total += chunk.len() as u64;
        }

        writer.shutdown().await.map_err(PipelineError::SourceIo)?;
        debug!(uri = %self.uri, bytes = total, "Source exhausted");

        Ok(total)
    }
}
