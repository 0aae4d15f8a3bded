//! Error types for the store module.

use thiserror::Error;

/// Errors obtaining a client for a destination bucket.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Bucket name was empty.
    #[error("Bucket name cannot be empty")]
    EmptyBucket,

    /// The client could not be built.
    #[error("Failed to create client for bucket {bucket}: {reason}")]
    Client { bucket: String, reason: String },

    /// The bucket is not reachable with the configured credentials.
    #[error("Bucket {bucket} is unavailable")]
    Unavailable { bucket: String },
}
