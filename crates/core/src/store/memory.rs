//! In-memory store provider.

use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use super::error::StoreError;
use super::StoreProvider;

/// Keeps one [`InMemory`] store per bucket. Buckets spring into existence on
/// first use unless marked unavailable.
#[derive(Default)]
pub struct MemoryStoreProvider {
    buckets: Mutex<HashMap<String, Arc<InMemory>>>,
    unavailable: Mutex<HashSet<String>>,
}

impl MemoryStoreProvider {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `bucket` fail with [`StoreError::Unavailable`].
    pub fn mark_unavailable(&self, bucket: impl Into<String>) {
        self.unavailable
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(bucket.into());
    }

    /// Returns the store backing `bucket`, creating it if needed.
    pub fn bucket(&self, bucket: &str) -> Arc<InMemory> {
        let mut buckets = self.buckets.lock().unwrap_or_else(|p| p.into_inner());
        Arc::clone(
            buckets
                .entry(bucket.to_string())
                .or_insert_with(|| Arc::new(InMemory::new())),
        )
    }

    /// Reads an object back, if it exists.
    pub async fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        let store = self.bucket(bucket);
        let result = store.get(&ObjectPath::from(key)).await.ok()?;
        result.bytes().await.ok().map(|b| b.to_vec())
    }
}

impl StoreProvider for MemoryStoreProvider {
    fn store_for(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>, StoreError> {
        if bucket.trim().is_empty() {
            return Err(StoreError::EmptyBucket);
        }

        let unavailable = self
            .unavailable
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .contains(bucket);
        if unavailable {
            return Err(StoreError::Unavailable {
                bucket: bucket.to_string(),
            });
        }

        Ok(self.bucket(bucket))
    }
}
