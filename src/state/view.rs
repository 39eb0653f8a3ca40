//! Read-only view models for the admin board and the display wall

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{announce::Overlay, format::format_clock};

use super::{Preferences, Timer, TimerId, TimerStatus};

/// Most timers the display wall will show at once
pub const DISPLAY_WALL_LIMIT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    #[default]
    Board,
    DisplayWall,
}

/// Presentation state that is not persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub mode: ViewMode,
    pub fullscreen: bool,
}

impl ViewState {
    pub fn overlays_suppressed(&self) -> bool {
        self.mode == ViewMode::DisplayWall
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerView {
    pub id: TimerId,
    pub label: String,
    pub icon: Option<String>,
    pub clock: String,
    pub remaining_sec: f64,
    pub duration_sec: u64,
    pub status: TimerStatus,
    pub progress: f64,
    pub pinned: bool,
    pub announce_thresholds: BTreeSet<u64>,
}

impl From<&Timer> for TimerView {
    fn from(timer: &Timer) -> Self {
        Self {
            id: timer.id.clone(),
            label: timer.label.clone(),
            icon: timer.icon.clone(),
            clock: format_clock(timer.remaining_sec.ceil()),
            remaining_sec: timer.remaining_sec,
            duration_sec: timer.duration_sec,
            status: timer.status,
            progress: timer.progress(),
            pinned: timer.pinned,
            announce_thresholds: timer.announce_thresholds.clone(),
        }
    }
}

/// Everything the admin board renders
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub timers: Vec<TimerView>,
    pub preferences: Preferences,
    pub view: ViewState,
    pub overlay: Option<Overlay>,
}

/// The minimal external-screen rendering
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayView {
    pub timers: Vec<TimerView>,
    pub background: Option<String>,
    pub fullscreen: bool,
}

/// Pick the timers for the display wall: pinned ones first, then the rest,
/// each group in board order, at most `DISPLAY_WALL_LIMIT`.
pub fn display_subset(timers: &[Timer]) -> Vec<&Timer> {
    let pinned = timers.iter().filter(|timer| timer.pinned);
    let others = timers.iter().filter(|timer| !timer.pinned);
    pinned.chain(others).take(DISPLAY_WALL_LIMIT).collect()
}
