//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod announcer;
pub mod saver;
pub mod ticker;

// Re-export main functions
pub use announcer::announcer_task;
pub use saver::save_task;
pub use ticker::tick_task;
