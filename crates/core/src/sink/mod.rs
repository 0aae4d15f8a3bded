//! Byte sinks draining the transform's stdout.
//!
//! Sinks are two-phase: [`ByteSink::consume`] streams every byte into a
//! staged destination, and the pipeline later decides whether the
//! [`StagedUpload`] is committed or aborted. Nothing becomes visible at the
//! destination unless every stage succeeded.

mod file_sink;
mod store_sink;
mod traits;

pub use file_sink::FileSink;
pub use store_sink::ObjectStoreSink;
pub use traits::{ByteSink, StagedUpload};

/// Read size used when draining a reader.
pub(crate) const CHUNK_SIZE: usize = 64 * 1024;
