use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::metrics::encode_metrics;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn health() -> &'static str {
    "OK"
}

pub async fn version() -> &'static str {
    VERSION
}

pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}

/// Anything without a route.
pub async fn not_implemented() -> StatusCode {
    StatusCode::NOT_IMPLEMENTED
}
