//! Inbound resize request.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors rejecting a request before any pipeline work starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid source URI {uri}: {reason}")]
    InvalidUri { uri: String, reason: String },
}

/// Fetch `uri`, thumbnail it to `width`, store the result at `bucket/key`.
///
/// Fields default to empty so that a missing field is reported by
/// [`ResizeRequest::validate`] rather than by the JSON decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeRequest {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub bucket: String,
    /// Passed to the transform uninterpreted.
    #[serde(default)]
    pub width: String,
}

impl ResizeRequest {
    pub fn new(
        uri: impl Into<String>,
        bucket: impl Into<String>,
        key: impl Into<String>,
        width: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            key: key.into(),
            bucket: bucket.into(),
            width: width.into(),
        }
    }

    /// Checks every field is present and the source is an http(s) URL.
    pub fn validate(&self) -> Result<(), RequestError> {
        for (name, value) in [
            ("uri", &self.uri),
            ("key", &self.key),
            ("bucket", &self.bucket),
            ("width", &self.width),
        ] {
            if value.trim().is_empty() {
                return Err(RequestError::MissingField(name));
            }
        }

        let url = reqwest::Url::parse(&self.uri).map_err(|e| RequestError::InvalidUri {
            uri: self.uri.clone(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(RequestError::InvalidUri {
                uri: self.uri.clone(),
                reason: format!("unsupported scheme '{}'", other),
            }),
        }
    }
}
