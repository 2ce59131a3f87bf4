//! High score persistence
//!
//! A single integer, read when the engine starts or resets a race and written
//! whenever a race sets a new best. Storage is best-effort: a failed write is
//! logged and play continues.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("high score storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("high score record is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("high score storage is unavailable")]
    Unavailable,
}

/// Key-value capability holding the best score
pub trait HighScoreStore: Send {
    /// Stored best score, 0 when nothing usable is stored
    fn load(&self) -> u64;

    fn save(&mut self, score: u64) -> Result<(), StoreError>;
}

/// On-disk record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct HighScoreRecord {
    pub high_score: u64,
}

/// JSON file store
#[derive(Debug, Clone)]
pub struct FileHighScoreStore {
    path: PathBuf,
}

impl FileHighScoreStore {
    /// Default file name, derived from the browser build's storage key
    pub const DEFAULT_FILE: &'static str = "horse-snake-highscore.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<HighScoreRecord>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

impl Default for FileHighScoreStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FILE)
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn load(&self) -> u64 {
        match self.read() {
            Ok(Some(record)) => {
                log::info!("Loaded high score {}", record.high_score);
                record.high_score
            }
            Ok(None) => {
                log::info!("No high score found, starting fresh");
                0
            }
            Err(err) => {
                log::warn!("Ignoring high score at {}: {}", self.path.display(), err);
                0
            }
        }
    }

    fn save(&mut self, score: u64) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(&HighScoreRecord { high_score: score })?;

        // Write aside and rename so a crash never leaves a torn record.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        log::info!("High score saved ({})", score);
        Ok(())
    }
}

/// In-memory store; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScoreStore {
    value: Arc<Mutex<Option<u64>>>,
    unavailable: bool,
}

impl MemoryHighScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(score: u64) -> Self {
        Self {
            value: Arc::new(Mutex::new(Some(score))),
            unavailable: false,
        }
    }

    /// A store whose writes always fail
    pub fn unavailable() -> Self {
        Self {
            value: Arc::default(),
            unavailable: true,
        }
    }

    /// What has been written so far
    pub fn stored(&self) -> Option<u64> {
        *self.value.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl HighScoreStore for MemoryHighScoreStore {
    fn load(&self) -> u64 {
        self.stored().unwrap_or(0)
    }

    fn save(&mut self, score: u64) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable);
        }
        *self.value.lock().unwrap_or_else(|e| e.into_inner()) = Some(score);
        Ok(())
    }
}
