//! Domain error type shared by the store, controls and HTTP handlers

use thiserror::Error;

use crate::state::TimerId;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("timer {0} not found")]
    NotFound(TimerId),

    #[error("timer {0} has finished; reset it before starting again")]
    AlreadyFinished(TimerId),

    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    #[error("unknown audio clip kind: {0}")]
    UnknownClipKind(String),

    #[error("failed to lock {0}")]
    Lock(&'static str),
}

pub type BoardResult<T> = Result<T, BoardError>;
