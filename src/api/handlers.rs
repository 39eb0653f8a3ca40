//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Json,
};
use tracing::info;

use crate::{
    error::BoardError,
    presets::{Preset, PRESETS},
    state::{AppState, BoardView, ClipKind, DisplayView, Language, Preferences, Timer, TimerId, ViewState},
};

use super::{
    requests::{
        parse_minutes, AddTimerRequest, DurationRequest, NudgeRequest, PinRequest,
        PreferencesRequest, ReferenceRequest, ThresholdsRequest, ViewRequest,
    },
    responses::{ApiError, ApiResponse, HealthResponse, StatusResponse},
};

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Handle GET /presets - List the one-click timer presets
pub async fn presets_handler() -> Json<&'static [Preset]> {
    Json(PRESETS)
}

/// Handle GET /board - Full admin board view
pub async fn board_handler(State(state): State<Arc<AppState>>) -> Result<Json<BoardView>, ApiError> {
    Ok(Json(state.board_view()?))
}

/// Handle GET /display - Minimal display-wall view
pub async fn display_handler(State(state): State<Arc<AppState>>) -> Result<Json<DisplayView>, ApiError> {
    Ok(Json(state.display_view()?))
}

/// Handle POST /timers - Add a timer from a preset or custom values
pub async fn add_timer_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddTimerRequest>,
) -> ApiResult<Timer> {
    let timer = state.add_timer(request.into_new_timer())?;
    info!("Timer {} added ({})", timer.id, timer.label);
    Ok(Json(ApiResponse::ok("Timer added", timer)))
}

/// Handle POST /timers/:id/start
pub async fn start_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<Timer> {
    let timer = state.start_timer(&TimerId::from(id))?;
    Ok(Json(ApiResponse::ok("Timer started", timer)))
}

/// Handle POST /timers/:id/pause
pub async fn pause_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<Timer> {
    let timer = state.pause_timer(&TimerId::from(id))?;
    Ok(Json(ApiResponse::ok("Timer paused", timer)))
}

/// Handle POST /timers/:id/reset
pub async fn reset_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<Timer> {
    let timer = state.reset_timer(&TimerId::from(id))?;
    Ok(Json(ApiResponse::ok("Timer reset", timer)))
}

/// Handle POST /timers/:id/nudge - Add or remove minutes (default +1)
pub async fn nudge_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Option<Json<NudgeRequest>>,
) -> ApiResult<Timer> {
    let minutes = request.map(|Json(r)| r.minutes()).unwrap_or(1.0);
    let timer = state.nudge_timer(&TimerId::from(id), minutes)?;
    Ok(Json(ApiResponse::ok(format!("Timer adjusted by {} min", minutes), timer)))
}

/// Handle PUT /timers/:id/duration
pub async fn duration_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<DurationRequest>,
) -> ApiResult<Timer> {
    // Unreadable input falls through to the one-minute floor
    let minutes = parse_minutes(&request.minutes).unwrap_or(0.0);
    let timer = state.set_duration(&TimerId::from(id), minutes)?;
    Ok(Json(ApiResponse::ok("Duration updated", timer)))
}

/// Handle PUT /timers/:id/thresholds
pub async fn thresholds_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<ThresholdsRequest>,
) -> ApiResult<Timer> {
    let timer = state.set_thresholds(&TimerId::from(id), &request.minute_list())?;
    Ok(Json(ApiResponse::ok("Announcements updated", timer)))
}

/// Handle PUT /timers/:id/pin
pub async fn pin_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<PinRequest>,
) -> ApiResult<Timer> {
    let timer = state.set_pinned(&TimerId::from(id), request.pinned)?;
    let message = if timer.pinned { "Timer pinned" } else { "Timer unpinned" };
    Ok(Json(ApiResponse::ok(message, timer)))
}

/// Handle DELETE /timers/:id - Idempotent removal
pub async fn remove_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<bool> {
    let removed = state.remove_timer(&TimerId::from(id))?;
    let message = if removed { "Timer removed" } else { "Timer already absent" };
    Ok(Json(ApiResponse::ok(message, removed)))
}

/// Handle GET /preferences
pub async fn get_preferences_handler(State(state): State<Arc<AppState>>) -> Result<Json<Preferences>, ApiError> {
    Ok(Json(state.get_preferences()?))
}

/// Handle PUT /preferences - Speech toggle, language and voice
pub async fn update_preferences_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PreferencesRequest>,
) -> ApiResult<Preferences> {
    // Unknown languages are ignored rather than rejected
    let language = request.language.as_deref().and_then(Language::parse);

    let preferences = state.update_preferences("preferences", |prefs| {
        if let Some(enabled) = request.speech_enabled {
            prefs.speech_enabled = enabled;
        }
        if let Some(language) = language {
            prefs.language = language;
        }
        if let Some(voice) = request.voice {
            prefs.voice = Some(voice).filter(|v| !v.trim().is_empty());
        }
    })?;
    Ok(Json(ApiResponse::ok("Preferences updated", preferences)))
}

/// Handle PUT /preferences/background
pub async fn set_background_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReferenceRequest>,
) -> ApiResult<Preferences> {
    let preferences = state.set_background(Some(request.reference))?;
    Ok(Json(ApiResponse::ok("Background set", preferences)))
}

/// Handle DELETE /preferences/background
pub async fn clear_background_handler(State(state): State<Arc<AppState>>) -> ApiResult<Preferences> {
    let preferences = state.set_background(None)?;
    Ok(Json(ApiResponse::ok("Background cleared", preferences)))
}

fn clip_kind(kind: &str) -> Result<ClipKind, ApiError> {
    ClipKind::parse(kind).ok_or_else(|| BoardError::UnknownClipKind(kind.to_string()).into())
}

/// Handle PUT /preferences/clips/:kind
pub async fn set_clip_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Json(request): Json<ReferenceRequest>,
) -> ApiResult<Preferences> {
    let preferences = state.set_clip(clip_kind(&kind)?, Some(request.reference))?;
    Ok(Json(ApiResponse::ok("Audio clip set", preferences)))
}

/// Handle DELETE /preferences/clips/:kind
pub async fn clear_clip_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> ApiResult<Preferences> {
    let preferences = state.set_clip(clip_kind(&kind)?, None)?;
    Ok(Json(ApiResponse::ok("Audio clip cleared", preferences)))
}

/// Handle PUT /view - Enter or leave the display wall
pub async fn view_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ViewRequest>,
) -> ApiResult<ViewState> {
    let view = state.set_view_mode(request.mode)?;
    Ok(Json(ApiResponse::ok("View updated", view)))
}

/// Handle POST /view/fullscreen - Toggle the fullscreen flag
pub async fn fullscreen_handler(State(state): State<Arc<AppState>>) -> ApiResult<ViewState> {
    let view = state.toggle_fullscreen()?;
    Ok(Json(ApiResponse::ok("Fullscreen toggled", view)))
}

/// Handle DELETE /overlay - Dismiss the current overlay
pub async fn dismiss_overlay_handler(State(state): State<Arc<AppState>>) -> ApiResult<()> {
    state.overlay.dismiss();
    Ok(Json(ApiResponse::ok("Overlay dismissed", ())))
}

/// Handle GET /status - Board summary
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ApiError> {
    let (timers, running) = {
        let board = state.board.lock().map_err(|_| BoardError::Lock("board"))?;
        let timers = board.store.timers();
        (timers.len(), timers.iter().filter(|t| t.is_running()).count())
    };
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timers,
        running,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
