//! Equine Glide - A grid snake arcade game
//!
//! Core modules:
//! - `sim`: Tick-driven simulation (movement, collisions, scoring, placement)
//! - `engine`: Owns the game state and wires it to the high score store
//! - `driver`: Fixed-period scheduler that feeds input and ticks the engine
//! - `highscores`: Best-effort high score persistence
//! - `settings`: Player settings loaded from JSON
//! - `input`: Key to command mapping
//! - `wisdom`: Flavor text shown after a stumble
//! - `render`: Read-only frame consumers

pub mod driver;
pub mod engine;
pub mod highscores;
pub mod input;
pub mod render;
pub mod settings;
pub mod sim;
pub mod wisdom;

pub use engine::{Engine, EngineError};
pub use highscores::{FileHighScoreStore, HighScoreStore, MemoryHighScoreStore};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Grid is GRID_SIZE x GRID_SIZE cells
    pub const GRID_SIZE: i32 = 20;
    /// Total number of cells on the grid
    pub const GRID_CELLS: usize = (GRID_SIZE * GRID_SIZE) as usize;

    /// Points awarded per food item (flat, never scaled)
    pub const FOOD_SCORE: u64 = 100;
    /// One extra segment per this many points
    pub const SCORE_PER_SEGMENT: u64 = 10_000;
    /// Chain length at the start of a race
    pub const INITIAL_SNAKE_LENGTH: usize = 3;

    /// Flat speed reduction when advancing a level (ms)
    pub const LEVEL_SPEED_STEP_MS: u64 = 2;

    /// Rejected draws allowed per placed cell before giving up
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 10_000;
}
