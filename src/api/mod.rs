//! HTTP API module
//!
//! This module contains the control endpoints and view models served to the
//! board front end.

pub mod handlers;
pub mod requests;
pub mod responses;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/presets", get(presets_handler))
        .route("/board", get(board_handler))
        .route("/display", get(display_handler))
        .route("/timers", post(add_timer_handler))
        .route("/timers/:id", delete(remove_handler))
        .route("/timers/:id/start", post(start_handler))
        .route("/timers/:id/pause", post(pause_handler))
        .route("/timers/:id/reset", post(reset_handler))
        .route("/timers/:id/nudge", post(nudge_handler))
        .route("/timers/:id/duration", put(duration_handler))
        .route("/timers/:id/thresholds", put(thresholds_handler))
        .route("/timers/:id/pin", put(pin_handler))
        .route("/preferences", get(get_preferences_handler).put(update_preferences_handler))
        .route(
            "/preferences/background",
            put(set_background_handler).delete(clear_background_handler),
        )
        .route(
            "/preferences/clips/:kind",
            put(set_clip_handler).delete(clear_clip_handler),
        )
        .route("/view", put(view_handler))
        .route("/view/fullscreen", post(fullscreen_handler))
        .route("/overlay", delete(dismiss_overlay_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app(dir: &TempDir) -> (Router, Arc<AppState>) {
        let storage = Storage::new(dir.path().join("board.json"));
        let state = Arc::new(AppState::load(storage, 0, "127.0.0.1".to_string()).unwrap());
        (create_router(Arc::clone(&state)), state)
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn timer_lifecycle_over_http() {
        let dir = TempDir::new().unwrap();
        let (app, _) = app(&dir);

        let (status, body) = call(&app, Method::POST, "/timers", Some(json!({ "preset": "yugioh" }))).await;
        assert_eq!(status, StatusCode::OK);
        let id = body["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["status"], "paused");
        assert_eq!(body["data"]["durationSec"], 2400);

        let (status, body) = call(&app, Method::POST, &format!("/timers/{id}/start"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "running");

        let (_, body) = call(&app, Method::POST, &format!("/timers/{id}/nudge"), Some(json!({ "minutes": -1 }))).await;
        assert_eq!(body["data"]["remainingSec"], 2340.0);

        let (_, body) = call(&app, Method::PUT, &format!("/timers/{id}/thresholds"), Some(json!({ "minutes": "10, x, 1" }))).await;
        assert_eq!(body["data"]["announceThresholds"], json!([60, 600]));

        let (_, body) = call(&app, Method::PUT, &format!("/timers/{id}/pin"), Some(json!({ "pinned": true }))).await;
        assert_eq!(body["data"]["pinned"], true);

        let (_, body) = call(&app, Method::GET, "/board", None).await;
        assert_eq!(body["timers"][0]["clock"], "39:00");

        let (status, body) = call(&app, Method::DELETE, &format!("/timers/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], true);
        let (status, body) = call(&app, Method::DELETE, &format!("/timers/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], false);
    }

    #[tokio::test]
    async fn errors_map_to_status_codes() {
        let dir = TempDir::new().unwrap();
        let (app, state) = app(&dir);

        let (status, body) = call(&app, Method::POST, "/timers/missing/start", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "error");

        let (status, _) = call(&app, Method::POST, "/timers", Some(json!({ "preset": "chess" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&app, Method::PUT, "/preferences/clips/bogus", Some(json!({ "reference": "a.wav" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = call(&app, Method::POST, "/timers", Some(json!({ "label": "Quick", "minutes": 1 }))).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();
        call(&app, Method::POST, &format!("/timers/{id}/start"), None).await;
        state.advance(60.0).unwrap();

        let (status, _) = call(&app, Method::POST, &format!("/timers/{id}/start"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, body) = call(&app, Method::POST, &format!("/timers/{id}/reset"), None).await;
        assert_eq!(body["data"]["status"], "paused");
        assert_eq!(body["data"]["remainingSec"], 60.0);
    }

    #[tokio::test]
    async fn invalid_duration_input_is_clamped() {
        let dir = TempDir::new().unwrap();
        let (app, _) = app(&dir);

        let (_, body) = call(&app, Method::POST, "/timers", Some(json!({ "label": "Casual" }))).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["durationSec"], 3000);

        let (_, body) = call(&app, Method::PUT, &format!("/timers/{id}/duration"), Some(json!({ "minutes": "soon" }))).await;
        assert_eq!(body["data"]["durationSec"], 60);

        let (_, body) = call(&app, Method::PUT, &format!("/timers/{id}/duration"), Some(json!({ "minutes": "45" }))).await;
        assert_eq!(body["data"]["durationSec"], 2700);
    }

    #[tokio::test]
    async fn display_wall_and_preferences() {
        let dir = TempDir::new().unwrap();
        let (app, _) = app(&dir);

        for preset in ["magic", "pokemon", "yugioh", "lorcana", "digimon"] {
            call(&app, Method::POST, "/timers", Some(json!({ "preset": preset }))).await;
        }

        let (_, body) = call(&app, Method::PUT, "/view", Some(json!({ "mode": "displayWall" }))).await;
        assert_eq!(body["data"]["mode"], "displayWall");

        let (_, body) = call(&app, Method::GET, "/display", None).await;
        assert_eq!(body["timers"].as_array().unwrap().len(), 4);

        let (_, body) = call(&app, Method::PUT, "/preferences", Some(json!({ "speechEnabled": false, "language": "zh", "voice": "" }))).await;
        assert_eq!(body["data"]["speechEnabled"], false);
        assert_eq!(body["data"]["language"], "zh");
        assert_eq!(body["data"]["voice"], Value::Null);

        let (_, body) = call(&app, Method::PUT, "/preferences/clips/fiveMinutes", Some(json!({ "reference": "five.mp3" }))).await;
        assert_eq!(body["data"]["clips"]["fiveMinutes"], "five.mp3");

        let (_, body) = call(&app, Method::PUT, "/preferences/background", Some(json!({ "reference": "bg.jpg" }))).await;
        assert_eq!(body["data"]["background"], "bg.jpg");

        let (_, body) = call(&app, Method::POST, "/view/fullscreen", None).await;
        assert_eq!(body["data"]["fullscreen"], true);

        let (_, body) = call(&app, Method::GET, "/display", None).await;
        assert_eq!(body["background"], "bg.jpg");
        assert_eq!(body["fullscreen"], true);

        let (status, body) = call(&app, Method::GET, "/presets", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().len() >= 4);

        let (status, body) = call(&app, Method::GET, "/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timers"], 5);
    }
}
