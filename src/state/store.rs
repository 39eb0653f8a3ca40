//! Ordered in-memory collection of timers

use tracing::{debug, info};

use crate::{
    error::{BoardError, BoardResult},
    presets::Preset,
};

use super::{Timer, TimerId, TimerPatch, TimerStatus};

/// Owner of every timer record; insertion order is display order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimerStore {
    timers: Vec<Timer>,
}

impl TimerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from already-normalized records
    pub fn from_timers(timers: Vec<Timer>) -> Self {
        Self { timers }
    }

    pub fn timers(&self) -> &[Timer] {
        &self.timers
    }

    pub fn get(&self, id: &TimerId) -> Option<&Timer> {
        self.timers.iter().find(|timer| &timer.id == id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn any_running(&self) -> bool {
        self.timers.iter().any(Timer::is_running)
    }

    /// Create a timer from a preset and append it to the board
    pub fn add(&mut self, preset: &Preset) -> TimerId {
        self.insert(preset.build())
    }

    /// Append a fully built timer, returning its id
    pub fn insert(&mut self, timer: Timer) -> TimerId {
        let id = timer.id.clone();
        info!("Adding timer {} ({}, {}s)", id, timer.label, timer.duration_sec);
        self.timers.push(timer);
        id
    }

    /// Merge the patch into the matching timer and return the updated record
    pub fn update(&mut self, id: &TimerId, patch: TimerPatch) -> BoardResult<Timer> {
        let timer = self
            .timers
            .iter_mut()
            .find(|timer| &timer.id == id)
            .ok_or_else(|| BoardError::NotFound(id.clone()))?;

        patch.apply(timer);
        debug!("Updated timer {}: {:?} {:.1}s", id, timer.status, timer.remaining_sec);
        Ok(timer.clone())
    }

    /// Delete the matching timer; returns whether anything was removed
    pub fn remove(&mut self, id: &TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| &timer.id != id);
        let removed = self.timers.len() != before;
        if removed {
            info!("Removed timer {}", id);
        }
        removed
    }

    /// Advance every running timer by `delta_sec`.
    ///
    /// Returns the ids of timers that finished during this tick.
    pub fn tick(&mut self, delta_sec: f64) -> Vec<TimerId> {
        let mut finished = Vec::new();
        if !delta_sec.is_finite() || delta_sec < 0.0 {
            return finished;
        }

        for timer in self.timers.iter_mut().filter(|timer| timer.is_running()) {
            let next = (timer.remaining_sec - delta_sec).max(0.0);
            timer.remaining_sec = next;
            if next == 0.0 {
                timer.status = TimerStatus::Finished;
                info!("Timer {} ({}) finished", timer.id, timer.label);
                finished.push(timer.id.clone());
            }
        }

        finished
    }
}
