//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Body limit used by [`create_router`].
pub const DEFAULT_BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    create_router_with_body_limit(state, DEFAULT_BODY_LIMIT)
}

/// Same as [`create_router`] with a custom request body limit in bytes.
pub fn create_router_with_body_limit(state: AppState, body_limit: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/detect_attention", post(handlers::detect_attention))
        .route("/calibrate", post(handlers::calibrate))
        .route("/room_attention", post(handlers::room_attention))
        .route("/health", get(handlers::health_check));

    Router::new()
        .nest("/api", api)
        // Frames arrive as base64 JSON
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
