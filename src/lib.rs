//! Timer Board - countdown timers for tabletop and card-game store events
//!
//! This library owns a board of independent named countdowns, advances them
//! on a fixed tick, detects milestones (thresholds and time's up) and
//! announces them through speech, pre-recorded clips and an overlay.

pub mod announce;
pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod presets;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{BoardError, BoardResult};
pub use format::format_clock;
pub use state::AppState;
pub use storage::Storage;
pub use utils::signals::shutdown_signal;
