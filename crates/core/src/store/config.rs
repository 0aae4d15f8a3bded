//! Configuration for object store access.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Credentials and endpoint for the object store.
#[derive(Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Access key id (`AWS_ACCESS_KEY_ID`).
    #[serde(default)]
    pub access_key_id: String,

    /// Secret access key (`AWS_SECRET_ACCESS_KEY`). Never serialized.
    #[serde(default, skip_serializing)]
    pub secret_access_key: String,

    /// Region (`AWS_REGION`).
    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint for S3-compatible stores (`AWS_ENDPOINT_URL`).
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Allow plain HTTP endpoints.
    #[serde(default)]
    pub allow_http: bool,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            access_key_id: String::new(),
            secret_access_key: String::new(),
            region: default_region(),
            endpoint_url: None,
            allow_http: false,
        }
    }
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .field("allow_http", &self.allow_http)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_not_serialized() {
        let config = StorageConfig {
            access_key_id: "AKIA".to_string(),
            secret_access_key: "hunter2".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("AKIA"));
        assert!(!json.contains("hunter2"));
    }
}
