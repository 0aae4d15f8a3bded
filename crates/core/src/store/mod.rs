//! Object store clients, derived per destination bucket.
//!
//! Credentials are validated once at startup and injected through a
//! [`StoreProvider`]; request code never reads ambient process state.

mod config;
mod error;
mod memory;
mod s3;

pub use config::StorageConfig;
pub use error::StoreError;
pub use memory::MemoryStoreProvider;
pub use s3::S3StoreProvider;

use object_store::ObjectStore;
use std::sync::Arc;

/// Hands out an authenticated store bound to one bucket.
pub trait StoreProvider: Send + Sync {
    /// Returns a client for `bucket`.
    fn store_for(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>, StoreError>;
}
