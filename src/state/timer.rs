//! Timer record and its lifecycle status

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fallback length for timers whose stored duration is missing or unusable
pub const DEFAULT_DURATION_SECS: u64 = 50 * 60;

/// Announcement thresholds applied when a record carries none (5 and 2 minutes)
pub const DEFAULT_THRESHOLDS: [u64; 2] = [300, 120];

/// Opaque, immutable timer identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(String);

impl TimerId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TimerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TimerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Running,
    #[default]
    Paused,
    Finished,
}

impl TimerStatus {
    /// Parse a stored status, tolerating case differences
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "running" => Some(Self::Running),
            "paused" => Some(Self::Paused),
            "finished" => Some(Self::Finished),
            _ => None,
        }
    }
}

/// A single countdown on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub id: TimerId,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub duration_sec: u64,
    pub remaining_sec: f64,
    pub status: TimerStatus,
    pub announce_thresholds: BTreeSet<u64>,
    #[serde(default)]
    pub pinned: bool,
}

impl Timer {
    /// Create a paused timer with a full countdown and the default thresholds
    pub fn new(label: impl Into<String>, icon: Option<String>, duration_sec: u64) -> Self {
        Self {
            id: TimerId::generate(),
            label: label.into(),
            icon,
            duration_sec,
            remaining_sec: duration_sec as f64,
            status: TimerStatus::Paused,
            announce_thresholds: DEFAULT_THRESHOLDS.into_iter().collect(),
            pinned: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn is_finished(&self) -> bool {
        self.status == TimerStatus::Finished
    }

    /// Remaining time rounded up to whole seconds, as shown and announced
    pub fn remaining_ceil(&self) -> i64 {
        self.remaining_sec.ceil() as i64
    }

    /// Fraction of the countdown already elapsed, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        if self.duration_sec == 0 {
            return 1.0;
        }
        (1.0 - self.remaining_sec / self.duration_sec as f64).clamp(0.0, 1.0)
    }

    /// Clamp a candidate remaining value into `[0, duration]`
    pub fn clamp_remaining(&self, remaining: f64) -> f64 {
        if !remaining.is_finite() {
            return 0.0;
        }
        remaining.clamp(0.0, self.duration_sec as f64)
    }
}

/// Partial update merged into a timer by `TimerStore::update`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimerPatch {
    pub label: Option<String>,
    pub icon: Option<Option<String>>,
    pub duration_sec: Option<u64>,
    pub remaining_sec: Option<f64>,
    pub status: Option<TimerStatus>,
    pub announce_thresholds: Option<BTreeSet<u64>>,
    pub pinned: Option<bool>,
}

impl TimerPatch {
    pub fn status(status: TimerStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn apply(self, timer: &mut Timer) {
        if let Some(label) = self.label {
            timer.label = label;
        }
        if let Some(icon) = self.icon {
            timer.icon = icon;
        }
        if let Some(duration) = self.duration_sec {
            timer.duration_sec = duration;
        }
        if let Some(remaining) = self.remaining_sec {
            timer.remaining_sec = remaining;
        }
        if let Some(status) = self.status {
            timer.status = status;
        }
        if let Some(thresholds) = self.announce_thresholds {
            timer.announce_thresholds = thresholds;
        }
        if let Some(pinned) = self.pinned {
            timer.pinned = pinned;
        }
    }
}
