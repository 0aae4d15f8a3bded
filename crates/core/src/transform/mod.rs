//! Transform module for the external byte-stream filter.
//!
//! A [`Transform`] describes an external process invocation: program plus
//! argument vector. It never performs I/O itself; the pipeline spawns the
//! command and wires its stdin/stdout.
//!
//! # Example
//!
//! ```ignore
//! use image_pipe_core::transform::{Thumbnailer, Transform, TransformConfig};
//!
//! let thumbnailer = Thumbnailer::new(&TransformConfig::default(), "200");
//! let command = thumbnailer.command();
//! ```

mod command;
mod config;
mod thumbnail;
mod traits;

pub use command::CommandTransform;
pub use config::TransformConfig;
pub use thumbnail::{thumbnail_args, Thumbnailer};
pub use traits::Transform;
