//! Milestone announcements
//!
//! Notifications from the tick are queued here and voiced strictly one at a
//! time, while an overlay is raised for each of them.

pub mod overlay;
pub mod phrases;
pub mod playback;

pub use overlay::{Overlay, OverlayController};
pub use phrases::phrase;
pub use playback::{deliver, AudioOutput, Playback, SystemAudio};
