//! Streaming pipeline orchestration.
//!
//! Wires a [`ByteSource`](crate::source::ByteSource) into the stdin of a
//! [`Transform`](crate::transform::Transform) process and the process stdout
//! into a [`ByteSink`](crate::sink::ByteSink). Bytes only ever sit in OS pipe
//! buffers and the sink's bounded upload buffer.
//!
//! ```text
//! source ──▶ [stdin] transform [stdout] ──▶ sink ──▶ commit / abort
//!                       [stderr] ──▶ bounded capture
//! ```

mod config;
mod error;
mod runner;
mod types;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use runner::Pipeline;
pub use types::{ByteReader, ByteWriter, PipelineReport, PipelineState, Stage};
