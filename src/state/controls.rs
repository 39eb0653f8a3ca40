//! Manual timer controls layered on `TimerStore::update`
//!
//! The store merges whatever it is given; these operations are the callers
//! that keep `0 <= remaining <= duration` and the Finished/reset rule intact.

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{BoardError, BoardResult};

use super::{Timer, TimerId, TimerPatch, TimerStatus, TimerStore};

/// Shortest duration a timer may be edited down to
pub const MIN_DURATION_SECS: u64 = 60;

impl TimerStore {
    fn require(&self, id: &TimerId) -> BoardResult<&Timer> {
        self.get(id).ok_or_else(|| BoardError::NotFound(id.clone()))
    }

    /// Start a paused timer. Finished timers must be reset first.
    pub fn start(&mut self, id: &TimerId) -> BoardResult<Timer> {
        let timer = self.require(id)?;
        match timer.status {
            TimerStatus::Finished => Err(BoardError::AlreadyFinished(id.clone())),
            TimerStatus::Running => Ok(timer.clone()),
            TimerStatus::Paused if timer.remaining_sec <= 0.0 => {
                // A paused timer at zero has nothing left to run
                self.update(id, TimerPatch::status(TimerStatus::Finished))
            }
            TimerStatus::Paused => self.update(id, TimerPatch::status(TimerStatus::Running)),
        }
    }

    pub fn pause(&mut self, id: &TimerId) -> BoardResult<Timer> {
        let timer = self.require(id)?;
        if timer.is_running() {
            self.update(id, TimerPatch::status(TimerStatus::Paused))
        } else {
            Ok(timer.clone())
        }
    }

    /// Restore the full duration and pause
    pub fn reset(&mut self, id: &TimerId) -> BoardResult<Timer> {
        let duration = self.require(id)?.duration_sec;
        self.update(
            id,
            TimerPatch {
                remaining_sec: Some(duration as f64),
                status: Some(TimerStatus::Paused),
                ..TimerPatch::default()
            },
        )
    }

    /// Add (or with a negative value, remove) whole minutes of remaining time
    pub fn nudge(&mut self, id: &TimerId, minutes: f64) -> BoardResult<Timer> {
        let timer = self.require(id)?;
        if !minutes.is_finite() {
            return Ok(timer.clone());
        }

        let remaining = timer.clamp_remaining(timer.remaining_sec + minutes * 60.0);
        let status = match timer.status {
            TimerStatus::Finished if remaining > 0.0 => Some(TimerStatus::Paused),
            TimerStatus::Running if remaining <= 0.0 => Some(TimerStatus::Finished),
            _ => None,
        };
        debug!("Nudging timer {} by {} min to {:.1}s", id, minutes, remaining);

        self.update(
            id,
            TimerPatch {
                remaining_sec: Some(remaining),
                status,
                ..TimerPatch::default()
            },
        )
    }

    /// Change the total duration; invalid or tiny values become one minute.
    ///
    /// A paused timer that has not been touched follows the new duration,
    /// any other timer keeps its remaining time clamped into the new range.
    pub fn set_duration(&mut self, id: &TimerId, minutes: f64) -> BoardResult<Timer> {
        let timer = self.require(id)?;
        let duration = duration_from_minutes(minutes);

        let untouched = timer.status == TimerStatus::Paused
            && timer.remaining_sec == timer.duration_sec as f64;
        let remaining = if untouched {
            duration as f64
        } else {
            timer.remaining_sec.clamp(0.0, duration as f64)
        };

        self.update(
            id,
            TimerPatch {
                duration_sec: Some(duration),
                remaining_sec: Some(remaining),
                ..TimerPatch::default()
            },
        )
    }

    /// Replace the announcement thresholds from a comma-separated minute list
    pub fn set_thresholds(&mut self, id: &TimerId, minutes: &str) -> BoardResult<Timer> {
        self.require(id)?;
        self.update(
            id,
            TimerPatch {
                announce_thresholds: Some(parse_threshold_minutes(minutes)),
                ..TimerPatch::default()
            },
        )
    }

    pub fn set_pinned(&mut self, id: &TimerId, pinned: bool) -> BoardResult<Timer> {
        self.update(
            id,
            TimerPatch {
                pinned: Some(pinned),
                ..TimerPatch::default()
            },
        )
    }
}

/// Convert user-entered minutes into a duration of at least one minute
pub fn duration_from_minutes(minutes: f64) -> u64 {
    if !minutes.is_finite() {
        return MIN_DURATION_SECS;
    }
    let secs = (minutes * 60.0).round();
    if secs < MIN_DURATION_SECS as f64 {
        MIN_DURATION_SECS
    } else {
        secs as u64
    }
}

/// Parse `"5, 2, 0.5"` into threshold seconds, silently dropping bad entries
pub fn parse_threshold_minutes(input: &str) -> BTreeSet<u64> {
    input
        .split(',')
        .filter_map(|entry| entry.trim().parse::<f64>().ok())
        .filter(|minutes| minutes.is_finite() && *minutes >= 0.0)
        .map(|minutes| (minutes * 60.0).round() as u64)
        .collect()
}
