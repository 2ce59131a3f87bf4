//! Game settings and preferences
//!
//! Persisted as JSON next to the high score file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::highscores::FileHighScoreStore;
use crate::sim::{Difficulty, Placement};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Tier used when a race starts
    pub difficulty: Difficulty,
    /// Fixed placement seed (None = fresh seed every session)
    pub seed: Option<u64>,
    /// Where the best score is kept
    pub high_score_path: PathBuf,

    // === Demo ===
    /// Let the built-in pilot steer
    pub autopilot: bool,
    /// Stop a headless race after this many ticks
    pub max_ticks: u64,

    // === Display ===
    /// Print a text frame after every tick
    pub render: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            seed: None,
            high_score_path: PathBuf::from(FileHighScoreStore::DEFAULT_FILE),

            autopilot: true,
            max_ticks: 5_000,

            render: true,
        }
    }
}

impl Settings {
    /// Settings file name
    pub const FILE_NAME: &'static str = "equine_glide_settings.json";

    /// Environment variable overriding the settings path
    pub const PATH_ENV: &'static str = "EQUINE_GLIDE_SETTINGS";

    /// Settings path from the environment, or the default file name
    pub fn default_path() -> PathBuf {
        std::env::var_os(Self::PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(Self::FILE_NAME))
    }

    /// Placement generator honoring the configured seed
    pub fn placement(&self) -> Placement {
        match self.seed {
            Some(seed) => Placement::new(seed),
            None => Placement::from_entropy(),
        }
    }

    pub fn high_score_store(&self) -> FileHighScoreStore {
        FileHighScoreStore::new(&self.high_score_path)
    }

    /// Read settings, `Ok(None)` if the file does not exist
    pub fn read(path: &Path) -> Result<Option<Self>, SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Load settings, falling back to defaults on any problem
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(err) => {
                log::warn!("{}; using default settings", err);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
