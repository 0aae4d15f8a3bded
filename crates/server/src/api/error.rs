//! Mapping of request and pipeline failures onto HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use image_pipe_core::{PipelineError, RequestError, Stage, StoreError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
}

/// Everything the resize endpoint can fail with.
#[derive(Debug)]
pub enum ApiError {
    /// Body was not a JSON object of the expected shape.
    Body(JsonRejection),
    /// A field was missing or malformed.
    Request(RequestError),
    /// No client could be built for the destination bucket.
    Store(StoreError),
    /// The pipeline ran and failed.
    Pipeline(PipelineError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Body(rejection) => rejection.status(),
            Self::Request(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Pipeline(e) => match e {
                PipelineError::Fetch { .. } | PipelineError::FetchStatus { .. } => {
                    StatusCode::BAD_GATEWAY
                }
                PipelineError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn stage(&self) -> Option<Stage> {
        match self {
            Self::Body(_) | Self::Request(_) => None,
            Self::Store(_) => Some(Stage::Sink),
            Self::Pipeline(e) => Some(e.stage()),
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Body(rejection) => rejection.body_text(),
            Self::Request(e) => e.to_string(),
            Self::Store(e) => e.to_string(),
            Self::Pipeline(e) => e.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl From<RequestError> for ApiError {
    fn from(e: RequestError) -> Self {
        Self::Request(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        Self::Pipeline(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.message(),
                stage: self.stage(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(RequestError::MissingField("uri")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(PipelineError::FetchStatus {
                uri: "http://x/cat.png".into(),
                status: 404
            })
            .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(PipelineError::Timeout { timeout_secs: 5 }).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::from(PipelineError::TransformFailed {
                code: Some(1),
                stderr: String::new()
            })
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(StoreError::EmptyBucket).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_stage_only_for_pipeline_side_failures() {
        assert_eq!(ApiError::from(RequestError::MissingField("key")).stage(), None);
        assert_eq!(
            ApiError::from(StoreError::EmptyBucket).stage(),
            Some(Stage::Sink)
        );
        assert_eq!(
            ApiError::from(PipelineError::store("b", "k", "denied")).stage(),
            Some(Stage::Sink)
        );
    }
}
