//! HTTP handlers for the REST API.
//!
//! Each handler validates its body, decodes the frame off the async
//! runtime, and delegates to [`crate::services`].

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use super::dto::{
    CalibrateResponse, DetectAttentionResponse, FrameRequest, HealthResponse,
    RoomAttentionRequest, RoomAttentionResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::models::EpochMillis;
use crate::services;
use crate::vision::Frame;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Decode a base64 frame on the blocking pool.
async fn decode_frame(image: String) -> Result<Frame, AppError> {
    let frame = tokio::task::spawn_blocking(move || Frame::from_base64(&image)).await??;
    Ok(frame)
}

/// POST /api/detect_attention
pub async fn detect_attention(
    State(state): State<AppState>,
    payload: Result<Json<FrameRequest>, JsonRejection>,
) -> HandlerResult<DetectAttentionResponse> {
    let Json(request) = payload?;
    let (image, user_id) = request.into_parts()?;
    let frame = decode_frame(image).await?;

    let report = services::detect_attention(
        state.repository.as_ref(),
        state.landmarks.as_ref(),
        &user_id,
        &frame,
        EpochMillis::now(),
    )
    .await?;

    Ok(Json(report.into()))
}

/// POST /api/calibrate
pub async fn calibrate(
    State(state): State<AppState>,
    payload: Result<Json<FrameRequest>, JsonRejection>,
) -> HandlerResult<CalibrateResponse> {
    let Json(request) = payload?;
    let (image, user_id) = request.into_parts()?;
    let frame = decode_frame(image).await?;

    let outcome = services::calibrate_user(
        state.repository.as_ref(),
        state.landmarks.as_ref(),
        &user_id,
        &frame,
        EpochMillis::now(),
    )
    .await?;

    Ok(Json(outcome.into()))
}

/// POST /api/room_attention
pub async fn room_attention(
    State(state): State<AppState>,
    payload: Result<Json<RoomAttentionRequest>, JsonRejection>,
) -> HandlerResult<RoomAttentionResponse> {
    let Json(request) = payload?;
    let (room_id, user_ids) = request.into_parts()?;

    let room = services::room_attention(
        state.repository.as_ref(),
        &room_id,
        &user_ids,
        EpochMillis::now(),
    );
    Ok(Json(room.into()))
}

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(services::health(state.repository.as_ref(), EpochMillis::now()).into())
}
