//! Local file sink.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tracing::{debug, warn};

use super::traits::{ByteSink, StagedUpload};
use super::CHUNK_SIZE;
use crate::pipeline::{ByteReader, PipelineError};

/// Writes to a local path.
///
/// Bytes land in `<path>.part` and are renamed into place on commit, so a
/// reader never observes a truncated file.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Creates a sink writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The final destination path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".part");
        PathBuf::from(name)
    }
}

#[async_trait]
impl ByteSink for FileSink {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn consume(&self, mut reader: ByteReader) -> Result<Box<dyn StagedUpload>, PipelineError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(PipelineError::SinkIo)?;
            }
        }

        let staging = self.staging_path();
        let file = File::create(&staging).await.map_err(PipelineError::SinkIo)?;
        let mut writer = BufWriter::new(file);
        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut total = 0u64;

        let copied: std::io::Result<()> = async {
            loop {
                let read = reader.read(&mut buffer).await?;
                if read == 0 {
                    break;
                }
                writer.write_all(&buffer[..read]).await?;
                total += read as u64;
            }
            writer.flush().await?;
            writer.get_ref().sync_all().await
        }
        .await;

        if let Err(e) = copied {
            remove_staging(&staging).await;
            return Err(PipelineError::SinkIo(e));
        }

        debug!(destination = %self.path.display(), bytes = total, "Output staged");

        Ok(Box::new(FileUpload {
            staging,
            destination: self.path.clone(),
            bytes: total,
        }))
    }
}

async fn remove_staging(staging: &Path) {
    if let Err(e) = fs::remove_file(staging).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %staging.display(), error = %e, "Failed to remove staging file");
        }
    }
}

struct FileUpload {
    staging: PathBuf,
    destination: PathBuf,
    bytes: u64,
}

#[async_trait]
impl StagedUpload for FileUpload {
    fn bytes(&self) -> u64 {
        self.bytes
    }

    async fn commit(self: Box<Self>) -> Result<u64, PipelineError> {
        fs::rename(&self.staging, &self.destination)
            .await
            .map_err(PipelineError::SinkIo)?;
        Ok(self.bytes)
    }

    async fn abort(self: Box<Self>) -> Result<(), PipelineError> {
        remove_staging(&self.staging).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_commit_renames_into_place() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("thumbs").join("cat.jpg");
        let sink = FileSink::new(&path);

        let staged = sink.consume(Box::new(&b"jpeg bytes"[..])).await.unwrap();
        assert!(!path.exists());
        assert!(dir.path().join("thumbs").join("cat.jpg.part").exists());

        assert_eq!(staged.commit().await.unwrap(), 10);
        assert_eq!(std::fs::read(&path).unwrap(), b"jpeg bytes");
        assert!(!dir.path().join("thumbs").join("cat.jpg.part").exists());
    }

    #[tokio::test]
    async fn test_abort_removes_staging_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cat.jpg");
        let sink = FileSink::new(&path);

        let staged = sink.consume(Box::new(&b"partial"[..])).await.unwrap();
        staged.abort().await.unwrap();

        assert!(!path.exists());
        assert!(!dir.path().join("cat.jpg.part").exists());
    }

    #[tokio::test]
    async fn test_abort_keeps_previous_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cat.jpg");
        std::fs::write(&path, b"old thumbnail").unwrap();

        let staged = FileSink::new(&path)
            .consume(Box::new(&b"new"[..]))
            .await
            .unwrap();
        staged.abort().await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"old thumbnail");
    }

    #[test]
    fn test_describe() {
        let sink = FileSink::new("/tmp/out.png");
        assert_eq!(sink.describe(), "/tmp/out.png");
        assert_eq!(sink.path(), Path::new("/tmp/out.png"));
    }
}
