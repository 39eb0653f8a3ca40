//! Fixed-interval tick that drives every running timer

use std::{sync::Arc, time::Duration};

use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::AppState;

/// Background task that advances the board by the real time elapsed since the
/// previous tick and periodically saves it while timers are running.
pub async fn tick_task(state: Arc<AppState>, period: Duration, autosave: Duration) {
    info!("Starting tick task (every {:?}, autosave every {:?})", period, autosave);

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    let mut last_tick = Instant::now();
    let mut last_save = last_tick;

    loop {
        ticker.tick().await;

        let now = Instant::now();
        let delta = now.duration_since(last_tick).as_secs_f64();
        last_tick = now;

        match state.advance(delta) {
            Ok(notifications) if !notifications.is_empty() => {
                debug!("Tick produced {} milestones", notifications.len());
            }
            Ok(_) => {}
            Err(e) => error!("Failed to advance timers: {}", e),
        }

        if now.duration_since(last_save) >= autosave {
            if state.any_running() {
                state.persist();
            }
            last_save = now;
        }
    }
}
