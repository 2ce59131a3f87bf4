//! Simulation module
//!
//! All gameplay logic lives here. This module must stay free of I/O:
//! - One cell per tick, no wall clock
//! - Seeded RNG only, confined to `placement`
//! - Transitions report what happened through [`GameEvent`]s
//! - No rendering, storage or platform dependencies

pub mod autopilot;
pub mod placement;
pub mod state;
pub mod tick;

pub use placement::{Placement, PlacementError};
pub use state::{
    Difficulty, DifficultyConfig, Direction, GameEvent, GameState, GameStatus, Point, level_goal,
    target_length,
};
pub use tick::{acknowledge_game_over, advance_level, apply_direction, start, tick, toggle_pause};
