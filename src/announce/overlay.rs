//! Transient big-screen overlay with a self-dismissing, cancellable timer

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::{task::JoinHandle, time::sleep};
use tracing::debug;

use crate::state::{Milestone, Notification, TimerId};

/// How long a threshold overlay stays up
pub const THRESHOLD_OVERLAY: Duration = Duration::from_secs(5);
/// How long a time's-up overlay stays up
pub const FINISHED_OVERLAY: Duration = Duration::from_secs(12);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    pub id: u64,
    pub timer_id: TimerId,
    pub label: String,
    pub milestone: Milestone,
    pub message: String,
    pub shown_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Holds the overlay currently on screen and the handle that will take it down
#[derive(Debug, Default)]
pub struct OverlayController {
    current: Arc<Mutex<Option<Overlay>>>,
    dismiss: Mutex<Option<JoinHandle<()>>>,
    next_id: AtomicU64,
}

impl OverlayController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duration_for(milestone: Milestone) -> Duration {
        match milestone {
            Milestone::Finished => FINISHED_OVERLAY,
            Milestone::Threshold(_) => THRESHOLD_OVERLAY,
        }
    }

    /// Show an overlay for a notification, replacing any overlay on screen.
    ///
    /// Must be called from within a tokio runtime.
    pub fn show(&self, notification: &Notification, message: String) -> Overlay {
        let duration = Self::duration_for(notification.milestone);
        let overlay = Overlay {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            timer_id: notification.timer_id.clone(),
            label: notification.label.clone(),
            milestone: notification.milestone,
            message,
            shown_at: Utc::now(),
            duration_ms: duration.as_millis() as u64,
        };

        if let Ok(mut current) = self.current.lock() {
            *current = Some(overlay.clone());
        }

        let current = Arc::clone(&self.current);
        let id = overlay.id;
        let handle = tokio::spawn(async move {
            sleep(duration).await;
            if let Ok(mut current) = current.lock() {
                if current.as_ref().map(|o| o.id) == Some(id) {
                    debug!("Overlay {} dismissed after {:?}", id, duration);
                    *current = None;
                }
            }
        });

        self.replace_handle(Some(handle));
        overlay
    }

    /// Take the overlay down now and cancel its pending dismissal
    pub fn dismiss(&self) {
        self.replace_handle(None);
        if let Ok(mut current) = self.current.lock() {
            *current = None;
        }
    }

    pub fn current(&self) -> Option<Overlay> {
        self.current.lock().ok().and_then(|current| current.clone())
    }

    fn replace_handle(&self, handle: Option<JoinHandle<()>>) {
        if let Ok(mut slot) = self.dismiss.lock() {
            if let Some(previous) = std::mem::replace(&mut *slot, handle) {
                previous.abort();
            }
        }
    }
}

impl Drop for OverlayController {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.dismiss.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(milestone: Milestone) -> Notification {
        Notification {
            timer_id: TimerId::from("t"),
            label: "Table 2".to_string(),
            milestone,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn threshold_overlay_auto_dismisses() {
        let overlays = OverlayController::new();
        overlays.show(&notification(Milestone::Threshold(300)), "five".to_string());
        assert!(overlays.current().is_some());

        sleep(Duration::from_secs(4)).await;
        assert!(overlays.current().is_some());

        sleep(Duration::from_secs(2)).await;
        assert!(overlays.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn finished_overlay_stays_longer() {
        let overlays = OverlayController::new();
        overlays.show(&notification(Milestone::Finished), "done".to_string());

        sleep(Duration::from_secs(6)).await;
        assert_eq!(overlays.current().unwrap().message, "done");

        sleep(Duration::from_secs(7)).await;
        assert!(overlays.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn newer_overlay_is_not_cut_short_by_older_timer() {
        let overlays = OverlayController::new();
        overlays.show(&notification(Milestone::Threshold(120)), "first".to_string());
        sleep(Duration::from_secs(3)).await;
        overlays.show(&notification(Milestone::Threshold(300)), "second".to_string());

        sleep(Duration::from_secs(3)).await;
        assert_eq!(overlays.current().unwrap().message, "second");

        sleep(Duration::from_secs(3)).await;
        assert!(overlays.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn manual_dismiss() {
        let overlays = OverlayController::new();
        overlays.show(&notification(Milestone::Finished), "done".to_string());
        overlays.dismiss();
        assert!(overlays.current().is_none());
    }
}
