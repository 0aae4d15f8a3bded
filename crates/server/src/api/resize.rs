use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::sync::Arc;
use tracing::info;

use image_pipe_core::{HttpSource, ObjectStoreSink, ResizeRequest, Thumbnailer};

use super::error::ApiError;
use crate::state::AppState;

/// POST /v1/
///
/// Fetches `uri`, thumbnails it to `width` and stores the result at
/// `bucket/key`. Blocks until the pipeline has finished, then echoes the
/// request.
pub async fn resize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ResizeRequest>, JsonRejection>,
) -> Result<Json<ResizeRequest>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let store = state.stores().store_for(&request.bucket)?;
    let source = HttpSource::new(state.http().clone(), &request.uri);
    let sink = ObjectStoreSink::new(store, &request.bucket, &request.key)
        .with_buffer(state.config().pipeline.upload_buffer_bytes);
    let thumbnailer = Thumbnailer::new(state.transform(), &request.width);

    let report = state.pipeline().run(&thumbnailer, source, sink).await?;

    info!(
        bucket = %request.bucket,
        key = %request.key,
        width = %request.width,
        bytes_out = report.bytes_out,
        elapsed_ms = report.elapsed_ms,
        "Thumbnail stored"
    );

    Ok(Json(request))
}
