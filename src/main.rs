//! Timer Board - countdown timers for tabletop and card-game store events
//!
//! This is the main entry point for the timer-board application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use timer_board::{
    announce::SystemAudio,
    api::create_router,
    config::Config,
    state::AppState,
    storage::Storage,
    tasks::{announcer_task, save_task, tick_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("timer_board={},tower_http=info", config.log_level()))
        .init();

    info!("Starting timer-board v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, data={}, tick={}ms",
          config.host, config.port, config.data_file.display(), config.tick_ms);

    // Load the board; malformed data is repaired, only I/O errors stop us
    let storage = Storage::new(&config.data_file);
    let state = Arc::new(AppState::load(storage, config.port, config.host.clone())?);

    // Detect speech and clip programs; missing ones are simply skipped
    let (tts_program, player_program) = config.audio_programs();
    let audio = SystemAudio::detect(tts_program, player_program).await;
    if !audio.can_speak() {
        warn!("No speech program available, announcements will be silent");
    }

    // Start the save, announcer and tick background tasks
    let saver = match state.take_saves() {
        Some(queue) => Some(tokio::spawn(save_task(state.storage().clone(), queue))),
        None => {
            warn!("Save queue already taken, saves will not reach disk until shutdown");
            None
        }
    };
    let announcer = match state.take_announcements() {
        Some(queue) => Some(tokio::spawn(announcer_task(Arc::clone(&state), queue, audio))),
        None => {
            warn!("Announcement queue already taken, announcer not started");
            None
        }
    };
    let ticker = tokio::spawn(tick_task(
        Arc::clone(&state),
        config.tick_interval(),
        config.autosave_interval(),
    ));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /board              - Full board view");
    info!("  GET    /display            - Display wall view (1-4 timers)");
    info!("  POST   /timers             - Add a timer from a preset or custom values");
    info!("  POST   /timers/:id/start   - Start / pause / reset / nudge a timer");
    info!("  PUT    /timers/:id/...     - Edit duration, thresholds, pin");
    info!("  DELETE /timers/:id         - Remove a timer");
    info!("  GET    /preferences        - Speech, language, background and clips");
    info!("  GET    /health             - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    ticker.abort();
    if let Some(announcer) = announcer {
        announcer.abort();
    }
    state.overlay.dismiss();

    if let Some(saver) = saver {
        saver.abort();
    }

    let final_state = Arc::clone(&state);
    match tokio::task::spawn_blocking(move || final_state.flush()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Failed to save board on shutdown: {:#}", e),
        Err(e) => error!("Shutdown save failed: {}", e),
    }

    info!("Server shutdown complete");
    Ok(())
}
