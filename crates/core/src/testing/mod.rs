//! Test doubles for the pipeline collaborators.
//!
//! These let tests drive the orchestrator with real child processes but
//! scripted sources and sinks.
//!
//! # Example
//!
//! ```rust,ignore
//! use image_pipe_core::testing::{MockSink, StaticSource};
//! use image_pipe_core::transform::CommandTransform;
//! use image_pipe_core::Pipeline;
//!
//! let sink = MockSink::new();
//! let report = Pipeline::with_defaults()
//!     .run(&CommandTransform::new("cat", Vec::<String>::new()), StaticSource::new(b"abc".to_vec()), sink.clone())
//!     .await?;
//!
//! assert_eq!(sink.committed().await, Some(b"abc".to_vec()));
//! ```

mod mock_sink;
mod mock_source;

pub use mock_sink::{MockSink, SinkBehavior};
pub use mock_source::{SourceBehavior, StaticSource};

/// Test fixtures and helper functions.
pub mod fixtures {
    /// Deterministic, non-repeating-looking payload of `len` bytes.
    pub fn payload(len: usize) -> Vec<u8> {
        let mut state = 0x2545_f491_u32;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            })
            .collect()
    }
}
