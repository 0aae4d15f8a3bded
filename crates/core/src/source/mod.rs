//! Byte sources feeding the transform's stdin.

mod http;
mod traits;

pub use http::HttpSource;
pub use traits::ByteSource;
