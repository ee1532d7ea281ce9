//! End-to-end tests of the `/api` routes through the axum router.
#![cfg(feature = "http-server")]

mod support;

use std::sync::Arc;

use attention_rust::db::{AttentionRepository, LocalRepository};
use attention_rust::http::{create_router, AppState};
use attention_rust::models::UserId;
use attention_rust::vision::{FixedLandmarkProvider, LandmarkProvider, NullLandmarkProvider};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use support::{attentive_face, closed_eyes, png_base64, png_data_uri, turned_away};

fn app_with(provider: Arc<dyn LandmarkProvider>) -> (Router, LocalRepository) {
    let repo = LocalRepository::new();
    let state = AppState::new(Arc::new(repo.clone()), provider);
    (create_router(state), repo)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn detect(app: &Router, user: &str, image: String) -> (StatusCode, Value) {
    post_json(
        app,
        "/api/detect_attention",
        json!({"image": image, "userId": user}),
    )
    .await
}

// =========================================================
// detect_attention
// =========================================================

#[tokio::test]
async fn test_dark_frame_reports_darkness() {
    let (app, _repo) = app_with(Arc::new(NullLandmarkProvider));
    let (status, body) = detect(&app, "u1", png_base64(10)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], "u1");
    assert_eq!(body["attentionState"], "darkness");
    assert_eq!(body["attentionCategory"], "inactive");
    assert_eq!(body["confidence"], 60.0);
    assert_eq!(body["attentionPercentage"], 0.0);
    assert!(body["stateSince"].is_i64());
    assert!(body["timestamp"].is_i64());
}

#[tokio::test]
async fn test_no_face_is_absent_on_every_call() {
    let (app, repo) = app_with(Arc::new(NullLandmarkProvider));
    for _ in 0..3 {
        let (status, body) = detect(&app, "u1", png_base64(128)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["attentionState"], "absent");
        assert_eq!(body["attentionCategory"], "inactive");
    }

    let handle = repo.record(&UserId::new("u1")).unwrap();
    assert_eq!(handle.lock().classifier.measurements().len(), 3);
}

#[tokio::test]
async fn test_closed_eyes_are_sleeping() {
    let (app, _repo) = app_with(Arc::new(FixedLandmarkProvider::new(closed_eyes())));
    let mut last = Value::Null;
    for _ in 0..3 {
        let (status, body) = detect(&app, "u1", png_base64(128)).await;
        assert_eq!(status, StatusCode::OK);
        last = body;
    }
    assert_eq!(last["attentionState"], "sleeping");
    assert_eq!(last["attentionCategory"], "inactive");
}

#[tokio::test]
async fn test_attentive_face_with_data_uri() {
    let (app, repo) = app_with(Arc::new(FixedLandmarkProvider::new(attentive_face())));
    let (status, body) = detect(&app, "u1", png_data_uri(128)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attentionState"], "attentive");
    assert_eq!(body["attentionCategory"], "attentive");
    // First frame calibrates the user
    assert!(repo.calibration(&UserId::new("u1")).is_some());
}

#[tokio::test]
async fn test_turned_head_majority_wins_over_single_frame() {
    let provider = Arc::new(FixedLandmarkProvider::new(attentive_face()));
    let (app, _repo) = app_with(provider.clone());
    for _ in 0..3 {
        detect(&app, "u1", png_base64(128)).await;
    }

    // One sideways glance does not flip the state
    provider.set(turned_away());
    let (_, body) = detect(&app, "u1", png_base64(128)).await;
    assert_eq!(body["attentionState"], "attentive");
}

#[tokio::test]
async fn test_missing_fields_are_bad_request() {
    let (app, repo) = app_with(Arc::new(NullLandmarkProvider));

    for body in [
        json!({"image": png_base64(128)}),
        json!({"userId": "u1"}),
        json!({"image": "", "userId": "u1"}),
        json!({}),
    ] {
        let (status, response) = post_json(&app, "/api/detect_attention", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "Missing required data");
        assert_eq!(response["code"], "BAD_REQUEST");
    }
    assert_eq!(repo.users_tracked(), 0);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (app, _repo) = app_with(Arc::new(NullLandmarkProvider));
    let request = Request::builder()
        .method("POST")
        .uri("/api/detect_attention")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required data");
}

#[tokio::test]
async fn test_invalid_base64_is_internal_error() {
    let (app, repo) = app_with(Arc::new(NullLandmarkProvider));
    let (status, body) = detect(&app, "u1", "%%% not base64 %%%".to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTERNAL_ERROR");
    assert!(body["error"].as_str().unwrap().contains("base64"));
    assert_eq!(repo.users_tracked(), 0);
}

#[tokio::test]
async fn test_undecodable_image_is_internal_error() {
    let (app, repo) = app_with(Arc::new(NullLandmarkProvider));
    // Valid base64, not an image
    let (status, body) = detect(&app, "u1", "aGVsbG8gd29ybGQ=".to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
    assert!(repo.record(&UserId::new("u1")).is_none());
}

// =========================================================
// calibrate
// =========================================================

#[tokio::test]
async fn test_calibrate_succeeds_once() {
    let (app, repo) = app_with(Arc::new(FixedLandmarkProvider::new(attentive_face())));
    let body = json!({"image": png_base64(128), "userId": "u1"});

    let (status, first) = post_json(&app, "/api/calibrate", body.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["userId"], "u1");
    assert_eq!(first["calibrationSuccess"], true);
    assert!(first["timestamp"].is_i64());

    let (_, second) = post_json(&app, "/api/calibrate", body).await;
    assert_eq!(second["calibrationSuccess"], false);

    // Calibration alone does not start tracking
    assert_eq!(repo.users_tracked(), 0);
}

#[tokio::test]
async fn test_calibrate_without_face_fails() {
    let (app, _repo) = app_with(Arc::new(NullLandmarkProvider));
    let (status, body) = post_json(
        &app,
        "/api/calibrate",
        json!({"image": png_base64(128), "userId": "u1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["calibrationSuccess"], false);
}

#[tokio::test]
async fn test_calibrate_missing_fields() {
    let (app, _repo) = app_with(Arc::new(NullLandmarkProvider));
    let (status, _) = post_json(&app, "/api/calibrate", json!({"userId": "u1"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =========================================================
// room_attention
// =========================================================

#[tokio::test]
async fn test_room_attention_unknown_user_defaults() {
    let (app, repo) = app_with(Arc::new(NullLandmarkProvider));
    let (status, body) = post_json(
        &app,
        "/api/room_attention",
        json!({"roomId": "room-1", "userIds": ["ghost"]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roomId"], "room-1");
    let ghost = &body["attention"]["ghost"];
    assert_eq!(ghost["attentionState"], "absent");
    assert_eq!(ghost["attentionCategory"], "inactive");
    assert_eq!(ghost["attentionPercentage"], 0.0);
    assert_eq!(ghost["confidence"], 100.0);
    assert_eq!(ghost["stateSince"], body["timestamp"]);
    assert_eq!(repo.users_tracked(), 0);
}

#[tokio::test]
async fn test_room_attention_reports_known_users() {
    let (app, _repo) = app_with(Arc::new(FixedLandmarkProvider::new(attentive_face())));
    detect(&app, "alice", png_base64(128)).await;

    let (_, body) = post_json(
        &app,
        "/api/room_attention",
        json!({"roomId": "room-1", "userIds": ["alice", "bob"]}),
    )
    .await;

    assert_eq!(body["attention"]["alice"]["attentionState"], "attentive");
    assert_eq!(body["attention"]["alice"]["attentionCategory"], "attentive");
    assert_eq!(body["attention"]["bob"]["attentionState"], "absent");
}

#[tokio::test]
async fn test_room_attention_missing_fields() {
    let (app, _repo) = app_with(Arc::new(NullLandmarkProvider));
    let (status, body) =
        post_json(&app, "/api/room_attention", json!({"roomId": "room-1"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required data");
}

// =========================================================
// health
// =========================================================

#[tokio::test]
async fn test_health_counts_tracked_users() {
    let (app, _repo) = app_with(Arc::new(NullLandmarkProvider));
    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["users_tracked"], 0);

    detect(&app, "u1", png_base64(128)).await;
    detect(&app, "u2", png_base64(128)).await;
    let (_, body) = get(&app, "/api/health").await;
    assert_eq!(body["users_tracked"], 2);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (app, _repo) = app_with(Arc::new(NullLandmarkProvider));
    let (status, _) = get(&app, "/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
