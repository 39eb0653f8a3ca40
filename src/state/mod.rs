//! State management module
//!
//! This module contains the timer board, its milestone tracking and the
//! application state that owns them.

pub mod app_state;
pub mod controls;
pub mod detector;
pub mod preferences;
pub mod store;
pub mod timer;
pub mod view;

// Re-export main types
pub use app_state::{AppState, Board, NewTimer};
pub use detector::{Milestone, MilestoneDetector, Notification};
pub use preferences::{ClipKind, Language, Preferences};
pub use store::TimerStore;
pub use timer::{Timer, TimerId, TimerPatch, TimerStatus, DEFAULT_DURATION_SECS, DEFAULT_THRESHOLDS};
pub use view::{display_subset, BoardView, DisplayView, TimerView, ViewMode, ViewState};
