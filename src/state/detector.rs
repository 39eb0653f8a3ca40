//! Milestone detection over successive ticks

use std::collections::HashMap;

use serde::Serialize;

use super::{Timer, TimerId};

/// Something worth announcing about a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "seconds", rename_all = "camelCase")]
pub enum Milestone {
    Threshold(u64),
    Finished,
}

/// A milestone paired with the timer it belongs to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub timer_id: TimerId,
    pub label: String,
    pub milestone: Milestone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastSeen {
    Remaining(i64),
    Finished,
}

/// Remembers the last remaining-second value seen per timer so every
/// milestone fires once.
#[derive(Debug, Default)]
pub struct MilestoneDetector {
    last_seen: HashMap<TimerId, LastSeen>,
}

impl MilestoneDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare the current timers against what was seen on the previous pass.
    ///
    /// Thresholds match on `ceil(remaining)` exactly; a tick that jumps over
    /// a value does not announce it.
    pub fn evaluate(&mut self, timers: &[Timer]) -> Vec<Notification> {
        let mut notifications = Vec::new();

        for timer in timers {
            let previous = self.last_seen.get(&timer.id).copied();

            if timer.is_finished() {
                if previous != Some(LastSeen::Finished) {
                    notifications.push(Notification {
                        timer_id: timer.id.clone(),
                        label: timer.label.clone(),
                        milestone: Milestone::Finished,
                    });
                }
                self.last_seen.insert(timer.id.clone(), LastSeen::Finished);
                continue;
            }

            let remaining = timer.remaining_ceil();
            let current = LastSeen::Remaining(remaining);
            if remaining >= 0
                && timer.announce_thresholds.contains(&(remaining as u64))
                && previous != Some(current)
            {
                notifications.push(Notification {
                    timer_id: timer.id.clone(),
                    label: timer.label.clone(),
                    milestone: Milestone::Threshold(remaining as u64),
                });
            }
            self.last_seen.insert(timer.id.clone(), current);
        }

        if self.last_seen.len() > timers.len() {
            self.last_seen
                .retain(|id, _| timers.iter().any(|timer| &timer.id == id));
        }

        notifications
    }

    /// Drop tracking state for a removed timer
    pub fn forget(&mut self, id: &TimerId) {
        self.last_seen.remove(id);
    }

    pub fn tracked(&self) -> usize {
        self.last_seen.len()
    }
}
