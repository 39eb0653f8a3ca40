//! On-disk persistence of the board
//!
//! The whole board is one JSON document. Loading never fails on content:
//! unreadable or malformed data is normalized into a usable board.

pub mod normalize;

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::state::{Preferences, Timer};

pub use normalize::normalize_document;

/// Layout version written into every saved document
pub const DOCUMENT_VERSION: u32 = 1;

/// Serialized form of the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardDocument {
    pub version: u32,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
    pub timers: Vec<Timer>,
    pub preferences: Preferences,
}

impl Default for BoardDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            saved_at: None,
            timers: Vec::new(),
            preferences: Preferences::default(),
        }
    }
}

/// A board document stamped with the order it was taken in
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub generation: u64,
    pub document: BoardDocument,
}

/// JSON file holding the board between runs.
///
/// Clones share one write lock, so writers never interleave and a snapshot
/// older than the one already on disk is dropped.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
    written: Arc<Mutex<u64>>,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            written: Arc::new(Mutex::new(0)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and normalize the stored board.
    ///
    /// A missing file yields an empty board; unparseable content is logged and
    /// also yields an empty board. Only I/O failures other than "not found"
    /// are returned as errors.
    pub fn load(&self) -> Result<BoardDocument> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No saved board at {}, starting empty", self.path.display());
                return Ok(BoardDocument::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };

        let value = match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Saved board at {} is not valid JSON ({}), starting empty", self.path.display(), e);
                return Ok(BoardDocument::default());
            }
        };

        let document = normalize_document(&value);
        info!("Loaded {} timers from {}", document.timers.len(), self.path.display());
        Ok(document)
    }

    /// Write the board unconditionally
    pub fn save(&self, document: &BoardDocument) -> Result<()> {
        let _written = self
            .written
            .lock()
            .map_err(|_| anyhow!("Storage lock poisoned"))?;
        self.write(document)
    }

    /// Write the snapshot unless a newer one already reached the disk.
    ///
    /// Returns whether the file was written.
    pub fn save_snapshot(&self, snapshot: &Snapshot) -> Result<bool> {
        let mut written = self
            .written
            .lock()
            .map_err(|_| anyhow!("Storage lock poisoned"))?;
        if snapshot.generation < *written {
            debug!("Skipping stale snapshot {} (disk has {})", snapshot.generation, *written);
            return Ok(false);
        }
        self.write(&snapshot.document)?;
        *written = snapshot.generation;
        Ok(true)
    }

    /// Atomic replace: a uniquely named temp file in the same directory, then rename
    fn write(&self, document: &BoardDocument) -> Result<()> {
        let parent = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
                parent
            }
            None => Path::new("."),
        };

        let mut document = document.clone();
        document.version = DOCUMENT_VERSION;
        document.saved_at = Some(Utc::now());

        let json = serde_json::to_string_pretty(&document).context("Failed to serialize board")?;
        let mut tmp = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
        tmp.write_all(json.as_bytes())
            .with_context(|| format!("Failed to write {}", tmp.path().display()))?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        debug!("Saved {} timers to {}", document.timers.len(), self.path.display());
        Ok(())
    }
}
