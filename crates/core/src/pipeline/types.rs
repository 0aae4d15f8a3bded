//! Types for the pipeline module.

use serde::Serialize;
use std::fmt;
use tokio::io::{AsyncRead, AsyncWrite};

/// Writable end handed to a source. Dropping it signals end-of-stream.
pub type ByteWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Readable end handed to a sink.
pub type ByteReader = Box<dyn AsyncRead + Send + Unpin>;

/// One of the three independently scheduled parts of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Source,
    Transform,
    Sink,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Transform => write!(f, "transform"),
            Self::Sink => write!(f, "sink"),
        }
    }
}

/// Lifecycle of a single run.
///
/// `Unstarted -> Piping -> Draining -> Exited`, with `Failed` reachable from
/// any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Process not spawned yet.
    Unstarted,
    /// Source and sink are both moving bytes.
    Piping,
    /// Input fully delivered; waiting for output and exit.
    Draining,
    /// Process exited successfully.
    Exited,
    /// A stage failed.
    Failed,
}

impl PipelineState {
    /// Whether this state ends the run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exited | Self::Failed)
    }

    /// Whether `next` is a legal successor.
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        match (self, next) {
            (Unstarted, Piping) | (Piping, Draining) | (Draining, Exited) => true,
            (Unstarted | Piping | Draining, Failed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unstarted => "unstarted",
            Self::Piping => "piping",
            Self::Draining => "draining",
            Self::Exited => "exited",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    /// Bytes the source delivered into the transform.
    pub bytes_in: u64,
    /// Bytes committed to the destination.
    pub bytes_out: u64,
    /// Wall time of the run.
    pub elapsed_ms: u64,
}
