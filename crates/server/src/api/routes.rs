use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use super::{handlers, middleware::metrics_middleware, resize};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Resize
        .route(
            "/v1/",
            post(resize::resize).fallback(handlers::not_implemented),
        )
        // Operations
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        .route("/metrics", get(handlers::metrics))
        .fallback(handlers::not_implemented)
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
}
