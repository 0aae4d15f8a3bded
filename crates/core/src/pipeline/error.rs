//! Error types for the pipeline module.

use thiserror::Error;

use super::types::Stage;

/// Errors that end a pipeline run. Every variant is fatal for the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The transform's stdin pipe was not available after spawn.
    #[error("Transform stdin could not be acquired")]
    StdinUnavailable,

    /// The transform's stdout pipe was not available after spawn.
    #[error("Transform stdout could not be acquired")]
    StdoutUnavailable,

    /// The transform process could not be started.
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The source could not be fetched.
    #[error("Failed to fetch {uri}: {reason}")]
    Fetch { uri: String, reason: String },

    /// The source answered with a non-success status.
    #[error("Fetching {uri} returned HTTP {status}")]
    FetchStatus { uri: String, status: u16 },

    /// Writing into the transform's stdin failed.
    #[error("Failed to feed transform input: {0}")]
    SourceIo(#[source] std::io::Error),

    /// The destination store rejected or failed the write.
    #[error("Failed to store {bucket}/{key}: {reason}")]
    Store {
        bucket: String,
        key: String,
        reason: String,
    },

    /// Reading the transform's stdout, or writing a local destination, failed.
    #[error("Failed to drain transform output: {0}")]
    SinkIo(#[source] std::io::Error),

    /// The transform exited unsuccessfully.
    #[error("Transform exited with code {code:?}: {stderr}")]
    TransformFailed { code: Option<i32>, stderr: String },

    /// Waiting for the transform to exit failed.
    #[error("Failed to wait for transform: {0}")]
    Wait(#[source] std::io::Error),

    /// A stage task panicked.
    #[error("The {stage} stage panicked")]
    StagePanicked { stage: Stage },

    /// A stage task was cancelled before finishing.
    #[error("The {stage} stage was aborted")]
    StageAborted { stage: Stage },

    /// The run exceeded its deadline.
    #[error("Pipeline timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },
}

impl PipelineError {
    /// Creates a new fetch error.
    pub fn fetch(uri: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            uri: uri.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a new store error.
    pub fn store(bucket: impl Into<String>, key: impl Into<String>, reason: impl ToString) -> Self {
        Self::Store {
            bucket: bucket.into(),
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// The stage the error is attributed to.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Fetch { .. } | Self::FetchStatus { .. } | Self::SourceIo(_) => Stage::Source,
            Self::Store { .. } | Self::SinkIo(_) => Stage::Sink,
            Self::StagePanicked { stage } | Self::StageAborted { stage } => *stage,
            Self::StdinUnavailable
            | Self::StdoutUnavailable
            | Self::Spawn { .. }
            | Self::TransformFailed { .. }
            | Self::Wait(_)
            | Self::Timeout { .. } => Stage::Transform,
        }
    }

    /// Captured stderr of a failed transform, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::TransformFailed { stderr, .. } if !stderr.is_empty() => Some(stderr),
            _ => None,
        }
    }
}
