//! S3 (and S3-compatible) store provider.

use object_store::aws::AmazonS3Builder;
use object_store::ObjectStore;
use std::sync::Arc;
use tracing::debug;

use super::config::StorageConfig;
use super::error::StoreError;
use super::StoreProvider;

/// Builds an S3 client for each requested bucket from pre-validated
/// credentials.
///
/// Bucket names come from clients, so nothing is kept per bucket; a client
/// lives as long as the request that asked for it.
pub struct S3StoreProvider {
    config: StorageConfig,
}

impl S3StoreProvider {
    /// Creates a provider from validated storage configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    fn build(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>, StoreError> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_region(&self.config.region)
            .with_access_key_id(&self.config.access_key_id)
            .with_secret_access_key(&self.config.secret_access_key)
            .with_allow_http(self.config.allow_http);

        if let Some(endpoint) = &self.config.endpoint_url {
            builder = builder.with_endpoint(endpoint);
        }

        let store = builder.build().map_err(|e| StoreError::Client {
            bucket: bucket.to_string(),
            reason: e.to_string(),
        })?;

        debug!(bucket = %bucket, region = %self.config.region, "Created object store client");
        Ok(Arc::new(store))
    }
}

impl StoreProvider for S3StoreProvider {
    fn store_for(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>, StoreError> {
        if bucket.trim().is_empty() {
            return Err(StoreError::EmptyBucket);
        }

        self.build(bucket)
    }
}
