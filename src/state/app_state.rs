//! Main application state: the single owner of the board

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Instant,
};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{
    announce::{phrase, OverlayController},
    error::{BoardError, BoardResult},
    presets::find_preset,
    storage::{BoardDocument, Snapshot, Storage},
};

use super::{
    controls::duration_from_minutes, display_subset, BoardView, ClipKind, DisplayView,
    MilestoneDetector, Notification, Preferences, Timer, TimerId, TimerStore, TimerView,
    ViewMode, ViewState,
};

/// Timers and their milestone tracking, always advanced together
#[derive(Debug, Default)]
pub struct Board {
    pub store: TimerStore,
    pub detector: MilestoneDetector,
}

/// How a new timer should be built
#[derive(Debug, Clone, PartialEq)]
pub enum NewTimer {
    Preset(String),
    Custom {
        label: String,
        minutes: f64,
        icon: Option<String>,
    },
}

/// Main application state shared by the HTTP handlers and background tasks
#[derive(Debug)]
pub struct AppState {
    pub board: Arc<Mutex<Board>>,
    pub preferences: Arc<Mutex<Preferences>>,
    pub view: Arc<Mutex<ViewState>>,
    pub overlay: OverlayController,
    storage: Storage,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Queue feeding the announcer task
    announce_tx: mpsc::UnboundedSender<Notification>,
    announce_rx: Mutex<Option<mpsc::UnboundedReceiver<Notification>>>,
    /// Queue feeding the save task
    save_tx: mpsc::UnboundedSender<Snapshot>,
    save_rx: Mutex<Option<mpsc::UnboundedReceiver<Snapshot>>>,
    generation: AtomicU64,
}

impl AppState {
    /// Build state around an already-loaded document
    pub fn new(storage: Storage, document: BoardDocument, port: u16, host: String) -> Self {
        let (announce_tx, announce_rx) = mpsc::unbounded_channel();
        let (save_tx, save_rx) = mpsc::unbounded_channel();

        Self {
            board: Arc::new(Mutex::new(Board {
                store: TimerStore::from_timers(document.timers),
                detector: MilestoneDetector::new(),
            })),
            preferences: Arc::new(Mutex::new(document.preferences)),
            view: Arc::new(Mutex::new(ViewState::default())),
            overlay: OverlayController::new(),
            storage,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            announce_tx,
            announce_rx: Mutex::new(Some(announce_rx)),
            save_tx,
            save_rx: Mutex::new(Some(save_rx)),
            generation: AtomicU64::new(0),
        }
    }

    /// Load the board from storage and prime milestone tracking
    pub fn load(storage: Storage, port: u16, host: String) -> anyhow::Result<Self> {
        let document = storage.load()?;
        let state = Self::new(storage, document, port, host);

        // Seed last-seen values so restored timers do not re-announce
        if let Ok(mut board) = state.board.lock() {
            let Board { store, detector } = &mut *board;
            detector.evaluate(store.timers());
        }

        Ok(state)
    }

    /// Hand the announcement queue to its consumer; only the first call gets it
    pub fn take_announcements(&self) -> Option<mpsc::UnboundedReceiver<Notification>> {
        self.announce_rx.lock().ok().and_then(|mut rx| rx.take())
    }

    /// Hand the save queue to the save task; only the first call gets it
    pub fn take_saves(&self) -> Option<mpsc::UnboundedReceiver<Snapshot>> {
        self.save_rx.lock().ok().and_then(|mut rx| rx.take())
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    fn lock_board(&self) -> BoardResult<std::sync::MutexGuard<'_, Board>> {
        self.board.lock().map_err(|_| BoardError::Lock("board"))
    }

    /// Current board contents in their persisted shape
    pub fn document(&self) -> BoardResult<BoardDocument> {
        let timers = self.lock_board()?.store.timers().to_vec();
        let preferences = self.get_preferences()?;
        Ok(BoardDocument {
            timers,
            preferences,
            ..BoardDocument::default()
        })
    }

    /// Current board contents, stamped so later snapshots win on disk
    pub fn snapshot(&self) -> BoardResult<Snapshot> {
        let document = self.document()?;
        Ok(Snapshot {
            generation: self.generation.fetch_add(1, Ordering::SeqCst) + 1,
            document,
        })
    }

    /// Write the board to storage right away, returning any failure
    pub fn flush(&self) -> anyhow::Result<()> {
        let snapshot = self.snapshot()?;
        self.storage.save_snapshot(&snapshot)?;
        info!("Board flushed to {}", self.storage.path().display());
        Ok(())
    }

    /// Queue the board for the save task, logging instead of failing
    pub fn persist(&self) {
        let snapshot = match self.snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Failed to snapshot board: {}", e);
                return;
            }
        };
        if let Err(e) = self.save_tx.send(snapshot) {
            warn!("Save task is not running: {}", e);
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Apply a user action to the store, announce any milestone it lands on,
    /// then record and persist it
    pub fn with_store<T, F>(&self, action: &str, updater: F) -> BoardResult<T>
    where
        F: FnOnce(&mut TimerStore) -> BoardResult<T>,
    {
        let mut board = self.lock_board()?;
        let Board { store, detector } = &mut *board;
        let result = updater(&mut *store)?;
        let notifications = detector.evaluate(store.timers());
        drop(board);

        for notification in &notifications {
            self.dispatch(notification);
        }
        self.record_action(action);
        self.persist();
        Ok(result)
    }

    pub fn add_timer(&self, new_timer: NewTimer) -> BoardResult<Timer> {
        let timer = match new_timer {
            NewTimer::Preset(key) => find_preset(&key)
                .ok_or(BoardError::UnknownPreset(key))?
                .build(),
            NewTimer::Custom { label, minutes, icon } => {
                let label = match label.trim() {
                    "" => "Timer".to_string(),
                    trimmed => trimmed.to_string(),
                };
                let icon = icon.filter(|icon| !icon.trim().is_empty());
                Timer::new(label, icon, duration_from_minutes(minutes))
            }
        };

        self.with_store("add", |store| {
            store.insert(timer.clone());
            Ok(timer)
        })
    }

    pub fn start_timer(&self, id: &TimerId) -> BoardResult<Timer> {
        self.with_store("start", |store| store.start(id))
    }

    pub fn pause_timer(&self, id: &TimerId) -> BoardResult<Timer> {
        self.with_store("pause", |store| store.pause(id))
    }

    pub fn reset_timer(&self, id: &TimerId) -> BoardResult<Timer> {
        self.with_store("reset", |store| store.reset(id))
    }

    pub fn nudge_timer(&self, id: &TimerId, minutes: f64) -> BoardResult<Timer> {
        self.with_store("nudge", |store| store.nudge(id, minutes))
    }

    pub fn set_duration(&self, id: &TimerId, minutes: f64) -> BoardResult<Timer> {
        self.with_store("duration", |store| store.set_duration(id, minutes))
    }

    pub fn set_thresholds(&self, id: &TimerId, minutes: &str) -> BoardResult<Timer> {
        self.with_store("thresholds", |store| store.set_thresholds(id, minutes))
    }

    pub fn set_pinned(&self, id: &TimerId, pinned: bool) -> BoardResult<Timer> {
        self.with_store("pin", |store| store.set_pinned(id, pinned))
    }

    /// Remove a timer and its milestone tracking; idempotent
    pub fn remove_timer(&self, id: &TimerId) -> BoardResult<bool> {
        let mut board = self.lock_board()?;
        let removed = board.store.remove(id);
        board.detector.forget(id);
        drop(board);

        if removed {
            self.record_action("remove");
            self.persist();
        }
        Ok(removed)
    }

    /// Advance all running timers and hand out any milestones reached
    pub fn advance(&self, delta_sec: f64) -> BoardResult<Vec<Notification>> {
        let mut board = self.lock_board()?;
        let Board { store, detector } = &mut *board;
        let finished = store.tick(delta_sec);
        let notifications = detector.evaluate(store.timers());
        drop(board);

        for notification in &notifications {
            self.dispatch(notification);
        }

        if !finished.is_empty() {
            self.persist();
        }
        Ok(notifications)
    }

    /// Queue a notification for speech and raise its overlay
    fn dispatch(&self, notification: &Notification) {
        info!("Milestone for {} ({}): {:?}", notification.label, notification.timer_id, notification.milestone);

        if let Err(e) = self.announce_tx.send(notification.clone()) {
            warn!("Announcer is not running: {}", e);
        }

        let suppressed = self
            .view
            .lock()
            .map(|view| view.overlays_suppressed())
            .unwrap_or(false);
        if suppressed {
            debug!("Display wall active, overlay suppressed");
            return;
        }

        let language = self
            .preferences
            .lock()
            .map(|prefs| prefs.language)
            .unwrap_or_default();
        self.overlay.show(
            notification,
            phrase(language, &notification.label, notification.milestone),
        );
    }

    pub fn any_running(&self) -> bool {
        self.board
            .lock()
            .map(|board| board.store.any_running())
            .unwrap_or(false)
    }

    pub fn get_preferences(&self) -> BoardResult<Preferences> {
        self.preferences
            .lock()
            .map(|prefs| prefs.clone())
            .map_err(|_| BoardError::Lock("preferences"))
    }

    /// Update preferences and persist them
    pub fn update_preferences<F>(&self, action: &str, updater: F) -> BoardResult<Preferences>
    where
        F: FnOnce(&mut Preferences),
    {
        let mut prefs = self
            .preferences
            .lock()
            .map_err(|_| BoardError::Lock("preferences"))?;
        updater(&mut prefs);
        let updated = prefs.clone();
        drop(prefs);

        self.record_action(action);
        self.persist();
        Ok(updated)
    }

    pub fn set_clip(&self, kind: ClipKind, reference: Option<String>) -> BoardResult<Preferences> {
        self.update_preferences("clip", |prefs| match reference.filter(|r| !r.trim().is_empty()) {
            Some(reference) => {
                prefs.clips.insert(kind, reference);
            }
            None => {
                prefs.clips.remove(&kind);
            }
        })
    }

    pub fn set_background(&self, reference: Option<String>) -> BoardResult<Preferences> {
        self.update_preferences("background", |prefs| {
            prefs.background = reference.filter(|r| !r.trim().is_empty());
        })
    }

    pub fn get_view(&self) -> BoardResult<ViewState> {
        self.view
            .lock()
            .map(|view| *view)
            .map_err(|_| BoardError::Lock("view"))
    }

    /// Switch between the admin board and the display wall
    pub fn set_view_mode(&self, mode: ViewMode) -> BoardResult<ViewState> {
        let mut view = self.view.lock().map_err(|_| BoardError::Lock("view"))?;
        view.mode = mode;
        let updated = *view;
        drop(view);

        if updated.overlays_suppressed() {
            self.overlay.dismiss();
        }
        info!("View mode set to {:?}", mode);
        Ok(updated)
    }

    pub fn toggle_fullscreen(&self) -> BoardResult<ViewState> {
        let mut view = self.view.lock().map_err(|_| BoardError::Lock("view"))?;
        view.fullscreen = !view.fullscreen;
        Ok(*view)
    }

    pub fn board_view(&self) -> BoardResult<BoardView> {
        let timers = self
            .lock_board()?
            .store
            .timers()
            .iter()
            .map(TimerView::from)
            .collect();

        Ok(BoardView {
            timers,
            preferences: self.get_preferences()?,
            view: self.get_view()?,
            overlay: self.overlay.current(),
        })
    }

    pub fn display_view(&self) -> BoardResult<DisplayView> {
        let timers = display_subset(self.lock_board()?.store.timers())
            .into_iter()
            .map(TimerView::from)
            .collect();

        Ok(DisplayView {
            timers,
            background: self.get_preferences()?.background,
            fullscreen: self.get_view()?.fullscreen,
        })
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Milestone, TimerStatus};
    use tempfile::TempDir;

    fn state_in(dir: &TempDir) -> AppState {
        let storage = Storage::new(dir.path().join("board.json"));
        AppState::load(storage, 0, "127.0.0.1".to_string()).unwrap()
    }

    #[tokio::test]
    async fn controls_queue_ordered_saves() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);
        let mut saves = state.take_saves().unwrap();
        assert!(state.take_saves().is_none());

        let timer = state.add_timer(NewTimer::Preset("magic".to_string())).unwrap();
        state.start_timer(&timer.id).unwrap();

        let added = saves.try_recv().unwrap();
        let started = saves.try_recv().unwrap();
        assert!(saves.try_recv().is_err());
        assert!(started.generation > added.generation);
        assert_eq!(added.document.timers[0].status, TimerStatus::Paused);
        assert_eq!(started.document.timers[0].status, TimerStatus::Running);

        // A late write of the older snapshot must not win
        state.storage().save_snapshot(&started).unwrap();
        assert!(!state.storage().save_snapshot(&added).unwrap());

        let reloaded = state_in(&dir);
        let doc = reloaded.document().unwrap();
        assert_eq!(doc.timers.len(), 1);
        assert_eq!(doc.timers[0].status, TimerStatus::Running);
        assert_eq!(state.get_last_action().0.as_deref(), Some("start"));
    }

    #[tokio::test]
    async fn custom_timer_input_is_sanitized() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);
        let timer = state
            .add_timer(NewTimer::Custom {
                label: "   ".to_string(),
                minutes: -10.0,
                icon: Some("".to_string()),
            })
            .unwrap();

        assert_eq!(timer.label, "Timer");
        assert_eq!(timer.duration_sec, 60);
        assert_eq!(timer.icon, None);
        assert!(matches!(
            state.add_timer(NewTimer::Preset("chess".to_string())),
            Err(BoardError::UnknownPreset(_))
        ));
    }

    #[tokio::test]
    async fn advance_queues_and_overlays_milestones() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);
        let mut announcements = state.take_announcements().unwrap();
        assert!(state.take_announcements().is_none());

        let timer = state
            .add_timer(NewTimer::Custom {
                label: "Finals".to_string(),
                minutes: 10.0,
                icon: None,
            })
            .unwrap();
        state.with_store("test", |store| {
            store.update(
                &timer.id,
                crate::state::TimerPatch {
                    remaining_sec: Some(301.0),
                    ..Default::default()
                },
            )
        })
        .unwrap();
        state.start_timer(&timer.id).unwrap();

        let fired = state.advance(1.0).unwrap();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].milestone, Milestone::Threshold(300));
        assert_eq!(announcements.try_recv().unwrap().milestone, Milestone::Threshold(300));
        assert_eq!(state.overlay.current().unwrap().message, "Finals: five minutes remaining.");

        assert!(state.advance(1.0).unwrap().is_empty());
    }

    #[tokio::test]
    async fn nudging_onto_a_threshold_announces_at_once() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);
        let mut announcements = state.take_announcements().unwrap();
        let timer = state
            .add_timer(NewTimer::Custom {
                label: "Table 6".to_string(),
                minutes: 6.0,
                icon: None,
            })
            .unwrap();

        state.nudge_timer(&timer.id, -1.0).unwrap();
        assert_eq!(announcements.try_recv().unwrap().milestone, Milestone::Threshold(300));

        state.start_timer(&timer.id).unwrap();
        for _ in 0..10 {
            state.advance(1.0).unwrap();
        }
        assert!(announcements.try_recv().is_err());
    }

    #[tokio::test]
    async fn nudging_running_timer_out_of_time_announces_finished() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);
        let mut announcements = state.take_announcements().unwrap();
        let timer = state
            .add_timer(NewTimer::Custom {
                label: "Table 2".to_string(),
                minutes: 1.0,
                icon: None,
            })
            .unwrap();
        state.start_timer(&timer.id).unwrap();

        let nudged = state.nudge_timer(&timer.id, -1.0).unwrap();
        assert_eq!(nudged.status, TimerStatus::Finished);
        assert_eq!(announcements.try_recv().unwrap().milestone, Milestone::Finished);

        state.advance(1.0).unwrap();
        assert!(announcements.try_recv().is_err());
    }

    #[tokio::test]
    async fn display_wall_suppresses_overlays() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);
        let timer = state
            .add_timer(NewTimer::Custom {
                label: "Table".to_string(),
                minutes: 1.0,
                icon: None,
            })
            .unwrap();
        state.start_timer(&timer.id).unwrap();
        state.set_view_mode(ViewMode::DisplayWall).unwrap();

        let fired = state.advance(60.0).unwrap();
        assert_eq!(fired[0].milestone, Milestone::Finished);
        assert!(state.overlay.current().is_none());
    }

    #[tokio::test]
    async fn remove_forgets_tracking() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);
        let timer = state.add_timer(NewTimer::Preset("pokemon".to_string())).unwrap();
        state.advance(1.0).unwrap();
        assert_eq!(state.board.lock().unwrap().detector.tracked(), 1);

        assert!(state.remove_timer(&timer.id).unwrap());
        assert!(!state.remove_timer(&timer.id).unwrap());
        assert_eq!(state.board.lock().unwrap().detector.tracked(), 0);
    }

    #[tokio::test]
    async fn preferences_round_trip_through_disk() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);
        state.set_clip(ClipKind::Finished, Some("gong.wav".to_string())).unwrap();
        state.set_background(Some("store.png".to_string())).unwrap();
        state.update_preferences("speech", |p| p.speech_enabled = false).unwrap();
        state.set_clip(ClipKind::Finished, None).unwrap();
        state.flush().unwrap();

        let prefs = state_in(&dir).get_preferences().unwrap();
        assert!(prefs.clips.is_empty());
        assert_eq!(prefs.background.as_deref(), Some("store.png"));
        assert!(!prefs.speech_enabled);
    }
}
